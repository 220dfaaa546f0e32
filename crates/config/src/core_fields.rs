//! System configuration fields

use crate::field::ConfigField;
use crate::settings::RuntimeEnvironment;
use crate::validators::Validator;

/// Keys cloaked in public listings
pub const HIDDEN_KEYS: &[&str] = &[
    "iid",
    "secret_key",
    "clansphere_auth_token",
    "smtp_password",
    "recaptcha_public_key",
    "recaptcha_private_key",
];

pub const LOG_LEVELS: &[&str] = &["debug", "info", "warning", "error", "critical"];

pub const LANGUAGES: &[&str] = &["en", "de"];

pub fn core_fields(environment: RuntimeEnvironment) -> Vec<ConfigField> {
    let dev_mode = !environment.is_production();

    vec![
        // core system settings
        ConfigField::text("database_uri", "").with_help(
            "The database URI. For more information about database settings consult the help.",
        ),
        ConfigField::boolean("force_https", false).with_help(
            "If a request to an http URL comes in, redirect to the same URL on https if this \
             is safely possible. This requires a working SSL setup.",
        ),
        ConfigField::boolean("database_debug", false).with_help(
            "If enabled, the database will collect the SQL statements and add them to the \
             bottom of the page for easier debugging.",
        ),
        ConfigField::text("clan_title", "My Clan Page"),
        ConfigField::text("clan_tagline", "just another Clan page"),
        ConfigField::text("site_url", "").with_help(
            "The base URL of the site. This has to be set to a full canonical URL \
             (including http or https).",
        ),
        ConfigField::text("clan_email", "")
            .with_validator(Validator::Email)
            .with_help("Sender address for notification e-mails and plugins that send mail."),
        ConfigField::text("timezone", "UTC").with_help(
            "The timezone of the site. All times and dates in the user interface are shown \
             in this timezone.",
        ),
        ConfigField::boolean("maintenance_mode", false)
            .with_help("If set to true, the site enables the maintenance mode."),
        ConfigField::text("session_cookie_name", "clansphere_session").with_help(
            "If there are multiple installations on the same host the cookie name should be \
             different for each one.",
        ),
        ConfigField::text("theme", "default"),
        ConfigField::text("secret_key", "").with_help(
            "The secret key is used for various security related tasks, for example signing \
             the session cookie.",
        ),
        ConfigField::choice("language", LANGUAGES.iter().copied(), "en"),
        ConfigField::text("iid", "")
            .with_help("Uniquely identifies the instance. Once set you should not modify it."),
        // log and development settings
        ConfigField::text("log_file", "clansphere.log"),
        ConfigField::choice("log_level", LOG_LEVELS.iter().copied(), "warning"),
        ConfigField::boolean("log_email_only", dev_mode).with_help(
            "Log e-mails into a mail.log file in the instance folder instead of delivering them.",
        ),
        ConfigField::boolean("passthrough_errors", dev_mode)
            .with_help("If set to true, errors are not caught so that debuggers can catch them."),
        // url settings
        ConfigField::text("account_url_prefix", "/account").with_validator(Validator::UrlPrefix),
        ConfigField::text("admin_url_prefix", "/admin").with_validator(Validator::UrlPrefix),
        // cache settings
        ConfigField::boolean("enable_eager_caching", false),
        ConfigField::integer("cache_timeout", 300).with_min(10),
        ConfigField::choice(
            "cache_system",
            ["null", "simple", "memcached", "filesystem"],
            "null",
        ),
        ConfigField::comma_separated("memcached_servers", Vec::new())
            .with_validator(Validator::NetAddr),
        ConfigField::text("filesystem_cache_path", "cache"),
        // email settings
        ConfigField::text("smtp_host", "localhost"),
        ConfigField::integer("smtp_port", 25),
        ConfigField::text("smtp_user", ""),
        ConfigField::text("smtp_password", ""),
        ConfigField::boolean("smtp_use_tls", false),
        // network settings
        ConfigField::integer("default_network_timeout", 5)
            .with_help("Default timeout in seconds for network related operations."),
        // plugin settings
        ConfigField::boolean("plugin_guard", !dev_mode),
        ConfigField::comma_separated("plugins", Vec::new()),
        ConfigField::comma_separated("plugin_searchpath", Vec::new()).with_help(
            "Comma separated paths searched for plugins. Relative paths are resolved against \
             the instance folder.",
        ),
        // reCAPTCHA settings
        ConfigField::boolean("recaptcha_enable", false).with_help(
            "Protect forms that guests can fill out. Requires API keys from the reCAPTCHA service.",
        ),
        ConfigField::boolean("recaptcha_use_ssl", true),
        ConfigField::text("recaptcha_public_key", ""),
        ConfigField::text("recaptcha_private_key", ""),
    ]
}
