//! コマンドライン引数

use std::num::NonZeroUsize;
use std::path::PathBuf;

use clap::Parser;
use profcollect_core::app::config::DEFAULT_MAX_PROFILE_BYTES;
use profcollect_core::domain::RetentionBound;

use crate::logging::LogFormat;

/// Retrieve pprof data from HTTPS endpoints and store it as immutable ConfigMaps.
#[derive(Debug, Parser)]
#[command(name = "profcollect", version)]
pub struct Args {
    /// Endpoints to collect, each as <group-name>:<https-url>
    #[arg(required = true, value_name = "GROUP:URL")]
    pub endpoints: Vec<String>,

    /// Namespace the profile ConfigMaps are created in
    #[arg(short, long, env = "POD_NAMESPACE")]
    pub namespace: String,

    /// ConfigMap document (YAML/JSON) or mounted ConfigMap directory holding the suspend flag
    #[arg(short, long)]
    pub config_path: PathBuf,

    /// Directory holding the client certificate (tls.crt) and key (tls.key)
    #[arg(long)]
    pub tls_cert_path: PathBuf,

    /// Maximum number of profiles kept per group
    #[arg(long, default_value = "5")]
    pub retention_limit: RetentionBound,

    /// Skip verification of the endpoints' server certificates
    #[arg(long)]
    pub insecure_skip_tls_verify: bool,

    /// PEM bundle of additional CAs trusted for the endpoints
    #[arg(long, conflicts_with = "insecure_skip_tls_verify")]
    pub ca_cert: Option<PathBuf>,

    /// Timeout for a single fetch, in seconds
    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u64).range(1..))]
    pub fetch_timeout_secs: u64,

    /// Deadline for the whole run, in seconds
    #[arg(long, default_value_t = 300, value_parser = clap::value_parser!(u64).range(1..))]
    pub run_timeout_secs: u64,

    /// Largest profile body accepted, in bytes (a ConfigMap holds at most 1 MiB)
    #[arg(long, default_value_t = DEFAULT_MAX_PROFILE_BYTES)]
    pub max_profile_bytes: u64,

    /// Number of endpoints fetched in parallel
    #[arg(long, default_value_t = NonZeroUsize::MIN)]
    pub concurrency: NonZeroUsize,

    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}
