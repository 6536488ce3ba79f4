use lettre::message::{MultiPart, SinglePart, header};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use mesrs_config::EmailConfig;
use mesrs_core::{AppError, Language};
use tracing::{info, instrument};

pub struct EmailService {
    config: EmailConfig,
}

impl EmailService {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    pub fn reset_link(&self, reset_token: &str) -> String {
        format!(
            "{}/auth/reset-password?token={}",
            self.config.frontend_url.trim_end_matches('/'),
            reset_token
        )
    }

    #[instrument(skip(self, reset_token))]
    pub async fn send_password_reset_email(
        &self,
        to_email: &str,
        to_name: &str,
        reset_token: &str,
        language: Language,
    ) -> Result<(), AppError> {
        let reset_link = self.reset_link(reset_token);
        let (subject, text_body) = match language {
            Language::Fr => (
                "Réinitialisation du mot de passe",
                format!(
                    "Bonjour {},\n\n\
                     Vous avez demandé la réinitialisation de votre mot de passe.\n\n\
                     Ouvrez le lien suivant pour choisir un nouveau mot de passe :\n\
                     {}\n\n\
                     Ce lien expire dans une heure.\n\n\
                     Si vous n'êtes pas à l'origine de cette demande, ignorez ce message.\n\n\
                     Ministère de l'Enseignement Supérieur et de la Recherche Scientifique",
                    to_name, reset_link
                ),
            ),
            Language::Ar => (
                "إعادة تعيين كلمة المرور",
                format!(
                    "مرحبا {}،\n\n\
                     لقد طلبت إعادة تعيين كلمة المرور.\n\n\
                     افتح الرابط التالي لاختيار كلمة مرور جديدة:\n\
                     {}\n\n\
                     تنتهي صلاحية هذا الرابط خلال ساعة واحدة.\n\n\
                     إذا لم تقم بهذا الطلب، يرجى تجاهل هذه الرسالة.\n\n\
                     وزارة التعليم العالي والبحث العلمي",
                    to_name, reset_link
                ),
            ),
        };

        let html_body = self.password_reset_template(&text_body, &reset_link, language);
        self.send_email(to_email, subject, &text_body, &html_body)
            .await
    }

    #[instrument(skip(self, html_body, text_body))]
    async fn send_email(
        &self,
        to_email: &str,
        subject: &str,
        text_body: &str,
        html_body: &str,
    ) -> Result<(), AppError> {
        if !self.config.enabled {
            info!(to = %to_email, subject, "SMTP disabled, email not sent");
            return Ok(());
        }

        let from = self.config.sender();

        let email = Message::builder()
            .from(
                from.parse()
                    .map_err(|e| AppError::internal_error(format!("Invalid from email: {}", e)))?,
            )
            .to(to_email
                .parse()
                .map_err(|e| AppError::internal_error(format!("Invalid to email: {}", e)))?)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_PLAIN)
                            .body(text_body.to_string()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_HTML)
                            .body(html_body.to_string()),
                    ),
            )
            .map_err(|e| AppError::internal_error(format!("Failed to build email: {}", e)))?;

        let mailer = if !self.config.has_credentials() {
            SmtpTransport::builder_dangerous(&self.config.smtp_host)
                .port(self.config.smtp_port)
                .build()
        } else {
            let creds = Credentials::new(
                self.config.smtp_username.clone(),
                self.config.smtp_password.clone(),
            );

            SmtpTransport::relay(&self.config.smtp_host)
                .map_err(|e| {
                    AppError::internal_error(format!("Failed to create SMTP relay: {}", e))
                })?
                .port(self.config.smtp_port)
                .credentials(creds)
                .build()
        };

        tokio::task::spawn_blocking(move || mailer.send(&email))
            .await
            .map_err(|e| AppError::internal_error(format!("Task join error: {}", e)))?
            .map_err(|e| AppError::internal_error(format!("Failed to send email: {}", e)))?;

        info!(to = %to_email, "Email sent");
        Ok(())
    }

    fn password_reset_template(&self, text: &str, reset_link: &str, language: Language) -> String {
        let (dir, button) = match language {
            Language::Fr => ("ltr", "Réinitialiser le mot de passe"),
            Language::Ar => ("rtl", "إعادة تعيين كلمة المرور"),
        };
        let paragraphs: String = text
            .split("\n\n")
            .map(|p| format!("<p style=\"color:#333333;line-height:1.5;\">{}</p>", p.replace('\n', "<br>")))
            .collect();

        format!(
            r#"<!DOCTYPE html>
<html lang="{lang}" dir="{dir}">
<head><meta charset="UTF-8"></head>
<body style="margin:0;padding:20px;font-family:Arial,sans-serif;background-color:#f4f4f4;">
  <div style="max-width:600px;margin:0 auto;background:#ffffff;border-radius:8px;overflow:hidden;">
    <div style="background-color:#006233;padding:24px;text-align:center;color:#ffffff;font-size:22px;">MESRS</div>
    <div style="padding:32px;">
      {paragraphs}
      <p style="text-align:center;margin:24px 0;">
        <a href="{link}" style="background-color:#00A652;color:#ffffff;padding:12px 32px;border-radius:6px;text-decoration:none;">{button}</a>
      </p>
    </div>
  </div>
</body>
</html>"#,
            lang = language.code(),
            dir = dir,
            paragraphs = paragraphs,
            link = reset_link,
            button = button,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> EmailService {
        EmailService::new(EmailConfig {
            frontend_url: "http://localhost:5173/".to_string(),
            ..EmailConfig::default()
        })
    }

    #[test]
    fn reset_link_points_to_client() {
        assert_eq!(
            service().reset_link("abc"),
            "http://localhost:5173/auth/reset-password?token=abc"
        );
    }

    #[test]
    fn arabic_template_is_rtl() {
        let html = service().password_reset_template("مرحبا", "http://x", Language::Ar);
        assert!(html.contains("dir=\"rtl\""));
        assert!(html.contains("lang=\"ar\""));
    }

    #[tokio::test]
    async fn disabled_smtp_skips_delivery() {
        service()
            .send_password_reset_email("a@una.mr", "Ahmed", "token", Language::Fr)
            .await
            .unwrap();
    }
}
