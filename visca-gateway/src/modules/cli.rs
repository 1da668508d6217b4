use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about = "Bridge VISCA-over-UDP controllers to ONVIF PTZ cameras")]
pub struct Args {
    /// JSON camera roster, re-read on every refresh
    #[arg(long, default_value = "visca_onvif_config.json")]
    pub roster: String,

    /// Seconds between roster refreshes
    #[arg(long, default_value_t = 10)]
    pub refresh_interval_secs: u64,

    /// How long a worker waits for a datagram before checking for stop
    #[arg(long, default_value_t = 10)]
    pub poll_timeout_ms: u64,

    /// Local address the VISCA ports are bound on
    #[arg(long, default_value = "0.0.0.0")]
    pub bind_host: String,

    /// ONVIF request timeout in milliseconds
    #[arg(long, default_value_t = 3000)]
    pub camera_timeout_ms: u64,

    /// Allow invalid TLS certificates for ONVIF HTTPS
    #[arg(long)]
    pub onvif_insecure: bool,

    #[arg(short = 'l', long = "log-level", help = "Log Level", default_value = "info")]
    pub log_level: String,

    /// Directory for the hourly rotated log files
    #[arg(long, default_value = "./log")]
    pub log_dir: String,
}
