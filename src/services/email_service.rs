use crate::error::Result;
use crate::models::email_outbox::EmailOutbox;
use crate::utils::sanitize::mask_email;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use sqlx::PgPool;

pub const KIND_VERIFICATION: &str = "verification";
pub const KIND_PASSWORD_RESET: &str = "password_reset";
pub const KIND_APPROVAL: &str = "approval";
pub const KIND_REJECTION: &str = "rejection";
pub const KIND_ADMIN_ALERT: &str = "admin_alert";

/// Claims one due row and leases it by pushing `next_retry_at` forward, all
/// in one statement. A second worker instance skips the row while delivery
/// is in flight; if the worker dies mid-send, the lease expires and the row
/// is redelivered.
const CLAIM_SQL: &str = r#"
UPDATE email_outbox
SET next_retry_at = NOW() + interval '60 seconds', updated_at = NOW()
WHERE id = (
    SELECT id FROM email_outbox
    WHERE status = 'pending' AND (next_retry_at IS NULL OR next_retry_at <= NOW())
    ORDER BY created_at ASC
    FOR UPDATE SKIP LOCKED
    LIMIT 1
)
RETURNING *"#;

/// DB-backed outbox. Handlers enqueue; a worker loop drains, so an SMTP
/// hiccup never blocks an HTTP response or loses a notification.
#[derive(Clone)]
pub struct EmailService {
    pool: PgPool,
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    admin_email: String,
}

impl EmailService {
    pub fn new(pool: PgPool) -> Result<Self> {
        let config = crate::config::get_config();
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
            .map_err(|e| crate::error::Error::Email(format!("SMTP relay config: {}", e)))?
            .port(config.smtp_port)
            .credentials(Credentials::new(
                config.smtp_username.clone(),
                config.smtp_password.clone(),
            ))
            .build();
        let from = config
            .email_from
            .parse()
            .map_err(|e| crate::error::Error::Email(format!("Invalid EMAIL_FROM: {}", e)))?;
        Ok(Self {
            pool,
            mailer,
            from,
            admin_email: config.admin_email.clone(),
        })
    }

    pub async fn enqueue(
        &self,
        kind: &str,
        recipient: &str,
        subject: &str,
        body: &str,
        critical: bool,
    ) -> Result<EmailOutbox> {
        let row: EmailOutbox = sqlx::query_as(
            r#"
            INSERT INTO email_outbox (kind, recipient, subject, body, critical, status)
            VALUES ($1, $2, $3, $4, $5, 'pending')
            RETURNING *
            "#,
        )
        .bind(kind)
        .bind(recipient)
        .bind(subject)
        .bind(body)
        .bind(critical)
        .fetch_one(&self.pool)
        .await?;
        tracing::info!(
            kind,
            recipient = %mask_email(recipient),
            "queued email"
        );
        Ok(row)
    }

    pub async fn enqueue_verification(&self, recipient: &str, username: &str, token: &str) -> Result<()> {
        let config = crate::config::get_config();
        let link = format!("{}/verify-email?token={}", config.app_base_url, token);
        let (subject, body) = templates::verification(username, &link);
        self.enqueue(KIND_VERIFICATION, recipient, &subject, &body, true)
            .await?;
        Ok(())
    }

    pub async fn enqueue_password_reset(&self, recipient: &str, username: &str, token: &str) -> Result<()> {
        let config = crate::config::get_config();
        let link = format!("{}/reset-password?token={}", config.app_base_url, token);
        let (subject, body) = templates::password_reset(username, &link);
        self.enqueue(KIND_PASSWORD_RESET, recipient, &subject, &body, true)
            .await?;
        Ok(())
    }

    pub async fn enqueue_approval(&self, recipient: &str, full_name_en: &str) -> Result<()> {
        let (subject, body) = templates::approval(full_name_en);
        self.enqueue(KIND_APPROVAL, recipient, &subject, &body, false)
            .await?;
        Ok(())
    }

    pub async fn enqueue_rejection(&self, recipient: &str, full_name_en: &str, notes: &str) -> Result<()> {
        let (subject, body) = templates::rejection(full_name_en, notes);
        self.enqueue(KIND_REJECTION, recipient, &subject, &body, false)
            .await?;
        Ok(())
    }

    async fn deliver(&self, outbox: &EmailOutbox) -> std::result::Result<(), String> {
        let to: Mailbox = outbox
            .recipient
            .parse()
            .map_err(|e| format!("invalid recipient: {}", e))?;
        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(outbox.subject.clone())
            .body(outbox.body.clone())
            .map_err(|e| format!("build message: {}", e))?;
        self.mailer
            .send(message)
            .await
            .map(|_| ())
            .map_err(|e| format!("smtp send: {}", e))
    }

    /// Delivers at most one due outbox row. Returns true when a row was
    /// handled so the worker can poll again immediately.
    pub async fn run_once(&self) -> Result<bool> {
        let claimed: Option<EmailOutbox> = sqlx::query_as(CLAIM_SQL)
            .fetch_optional(&self.pool)
            .await?;
        let Some(outbox) = claimed else { return Ok(false) };
        let id = outbox.id;

        match self.deliver(&outbox).await {
            Ok(()) => {
                sqlx::query(
                    r#"UPDATE email_outbox
                       SET status = 'sent', attempts = attempts + 1, last_error = NULL, updated_at = NOW()
                       WHERE id = $1"#,
                )
                .bind(id)
                .execute(&self.pool)
                .await?;
                tracing::info!(kind = %outbox.kind, recipient = %mask_email(&outbox.recipient), "email sent");
            }
            Err(err) => {
                let attempts = outbox.attempts + 1;
                if attempts < outbox.max_attempts {
                    sqlx::query(
                        r#"UPDATE email_outbox
                           SET attempts = $1, last_error = $2,
                               next_retry_at = NOW() + make_interval(secs => LEAST(3600, 30 * power(2::float, GREATEST(0, $1 - 1))::int)),
                               updated_at = NOW()
                           WHERE id = $3"#,
                    )
                    .bind(attempts)
                    .bind(&err)
                    .bind(id)
                    .execute(&self.pool)
                    .await?;
                } else {
                    sqlx::query(
                        r#"UPDATE email_outbox
                           SET status = 'failed', attempts = $1, last_error = $2, updated_at = NOW()
                           WHERE id = $3"#,
                    )
                    .bind(attempts)
                    .bind(&err)
                    .bind(id)
                    .execute(&self.pool)
                    .await?;
                    tracing::error!(
                        kind = %outbox.kind,
                        recipient = %mask_email(&outbox.recipient),
                        "email delivery exhausted retries: {}",
                        err
                    );
                    if outbox.critical && outbox.kind != KIND_ADMIN_ALERT {
                        let (subject, body) =
                            templates::admin_alert(&outbox.kind, &mask_email(&outbox.recipient), &err);
                        let _ = self
                            .enqueue(KIND_ADMIN_ALERT, &self.admin_email, &subject, &body, false)
                            .await;
                    }
                }
            }
        }

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claim_marks_the_row_in_the_same_statement_that_selects_it() {
        // Claiming and leasing must be one statement; a bare locked SELECT
        // releases the lock before delivery starts and a second worker
        // would pick the same row up.
        assert!(CLAIM_SQL.trim_start().starts_with("UPDATE email_outbox"));
        assert!(CLAIM_SQL.contains("FOR UPDATE SKIP LOCKED"));
        assert!(CLAIM_SQL.contains("next_retry_at = NOW() + interval"));
        assert!(CLAIM_SQL.contains("RETURNING *"));
    }
}

/// Plain-text bodies with bilingual subject lines.
pub mod templates {
    pub fn verification(username: &str, link: &str) -> (String, String) {
        (
            "Verify your email / आफ्नो इमेल प्रमाणित गर्नुहोस्".to_string(),
            format!(
                "Dear {username},\n\n\
                 Please verify your email address by opening the link below. \
                 The link is valid for 24 hours.\n\n{link}\n\n\
                 कृपया तलको लिङ्क खोलेर आफ्नो इमेल ठेगाना प्रमाणित गर्नुहोस्। \
                 यो लिङ्क २४ घण्टासम्म मान्य रहनेछ।\n"
            ),
        )
    }

    pub fn password_reset(username: &str, link: &str) -> (String, String) {
        (
            "Password reset / पासवर्ड रिसेट".to_string(),
            format!(
                "Dear {username},\n\n\
                 A password reset was requested for your account. The link below \
                 is valid for 1 hour and can be used once.\n\n{link}\n\n\
                 If you did not request this, you can ignore this message.\n"
            ),
        )
    }

    pub fn approval(full_name_en: &str) -> (String, String) {
        (
            "Your candidate profile is approved / तपाईंको उम्मेदवार प्रोफाइल स्वीकृत भयो".to_string(),
            format!(
                "Dear {full_name_en},\n\n\
                 Your candidate profile has been reviewed and approved. It is now \
                 publicly visible to voters.\n\n\
                 तपाईंको उम्मेदवार प्रोफाइल स्वीकृत भएको छ र अब मतदाताहरूले हेर्न सक्छन्।\n"
            ),
        )
    }

    pub fn rejection(full_name_en: &str, notes: &str) -> (String, String) {
        (
            "Your candidate profile needs changes / तपाईंको प्रोफाइलमा परिवर्तन आवश्यक छ".to_string(),
            format!(
                "Dear {full_name_en},\n\n\
                 Your candidate profile could not be approved in its current form.\n\n\
                 Reviewer notes:\n{notes}\n\n\
                 You can edit your profile and submit it again.\n"
            ),
        )
    }

    pub fn admin_alert(kind: &str, masked_recipient: &str, error: &str) -> (String, String) {
        (
            format!("[nirdaliya] critical email delivery failure: {kind}"),
            format!(
                "Delivery of a critical '{kind}' email to {masked_recipient} \
                 exhausted all retries.\n\nLast error:\n{error}\n"
            ),
        )
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn templates_embed_inputs_and_bilingual_subjects() {
            let (subject, body) = verification("ram", "https://x/verify?token=abc");
            assert!(subject.contains("इमेल"));
            assert!(body.contains("ram"));
            assert!(body.contains("token=abc"));

            let (subject, body) = rejection("Ram Bahadur", "manifesto too short");
            assert!(subject.contains('/'));
            assert!(body.contains("manifesto too short"));
        }

        #[test]
        fn admin_alert_never_carries_raw_recipient() {
            let (_, body) = admin_alert("verification", "j***@example.com", "boom");
            assert!(body.contains("j***@example.com"));
            assert!(!body.contains("jdoe@"));
        }
    }
}
