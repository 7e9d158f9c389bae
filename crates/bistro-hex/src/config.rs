use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub paypal: PaypalSettings,
    pub mail: MailSettings,
    /// Used as the brand name towards the payment provider and in mail copy.
    pub restaurant_name: String,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: String,
    pub public_dir: PathBuf,
}

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub orders_file: PathBuf,
}

#[derive(Debug, Clone)]
pub struct PaypalSettings {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub environment: String,
    pub currency: String,
}

impl PaypalSettings {
    pub fn is_configured(&self) -> bool {
        self.client_id.is_some() && self.client_secret.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct MailSettings {
    /// Present only when host, user, password and from are all set.
    pub smtp: Option<SmtpSettings>,
    pub operator_email: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub secure: bool,
    pub user: String,
    pub password: String,
    pub from: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let server = ServerConfig {
            port: env::var("PORT").unwrap_or_else(|_| "5000".into()),
            public_dir: PathBuf::from(env::var("PUBLIC_DIR").unwrap_or_else(|_| "public".into())),
        };
        let store = StoreConfig {
            orders_file: PathBuf::from(
                env::var("ORDERS_FILE").unwrap_or_else(|_| "data/orders.json".into()),
            ),
        };

        let paypal = PaypalSettings {
            client_id: non_empty(env::var("PAYPAL_CLIENT_ID").ok()),
            client_secret: non_empty(env::var("PAYPAL_CLIENT_SECRET").ok()),
            environment: env::var("PAYPAL_ENV").unwrap_or_else(|_| "sandbox".into()),
            currency: env::var("CURRENCY").unwrap_or_else(|_| "EUR".into()),
        };

        let smtp = match (
            non_empty(env::var("SMTP_HOST").ok()),
            non_empty(env::var("SMTP_USER").ok()),
            non_empty(env::var("SMTP_PASS").ok()),
            non_empty(env::var("MAIL_FROM").ok()),
        ) {
            (Some(host), Some(user), Some(password), Some(from)) => Some(SmtpSettings {
                host,
                port: env::var("SMTP_PORT")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(587),
                secure: env::var("SMTP_SECURE").map(|v| v == "true").unwrap_or(false),
                user,
                password,
                from,
            }),
            _ => None,
        };
        let mail = MailSettings {
            smtp,
            operator_email: non_empty(env::var("MAIL_TO_RESTAURANT").ok()),
        };

        Ok(Self {
            server,
            store,
            paypal,
            mail,
            restaurant_name: env::var("RESTAURANT_NAME")
                .unwrap_or_else(|_| "Bistro Aurora".into()),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
