use clap::{Parser, Subcommand, Args};

#[derive(Parser)]
#[command(name = "cloudmare", version, about = "Origin IP discovery behind WAF/CDN reverse proxies")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress the banner and non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Look for the origin server of a protected domain
    Scan(ScanArgs),
    /// Validate a configuration file
    Validate(ValidateArgs),
}

#[derive(Args, Clone, Default)]
pub struct ScanArgs {
    /// Target domain or URL (e.g. https://www.example.com)
    pub domain: String,

    /// YAML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Candidate host or IP to test (repeatable, comma-separated)
    #[arg(long = "host", value_delimiter = ',')]
    pub hosts: Vec<String>,

    /// File with one candidate host or IP per line
    #[arg(long)]
    pub host_file: Option<String>,

    /// Subdomain wordlist for DNS brute force
    #[arg(short, long)]
    pub wordlist: Option<String>,

    /// Add MX and NS record targets of the domain and its extension variants as candidates
    #[arg(long)]
    pub records: bool,

    /// Extensions tried against the site name with --records (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub extensions: Vec<String>,

    /// Shodan API key (or $ENV_VAR) to search for associated IPs
    #[arg(long)]
    pub shodan: Option<String>,

    /// Censys API_ID:SECRET (or $ENV_VAR) to search for associated IPs
    #[arg(long)]
    pub censys: Option<String>,

    /// SecurityTrails API key (or $ENV_VAR) for historical A records
    #[arg(long)]
    pub securitytrails: Option<String>,

    /// HTTP timeout in seconds
    #[arg(long)]
    pub timeout: Option<f64>,

    /// Body similarity above which a candidate counts as the origin (0-1)
    #[arg(long)]
    pub threshold: Option<f64>,

    /// Delay between requests in seconds: "N" or "MIN-MAX"
    #[arg(long)]
    pub delay: Option<String>,

    /// Never prompt: follow redirects and force non-200 connections
    #[arg(long)]
    pub auto_force: bool,

    /// Candidates tested in parallel (requires --auto-force)
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Default answer "no" when asked to follow a redirect
    #[arg(long)]
    pub no_follow_redirects: bool,

    /// Fixed User-Agent header
    #[arg(long, conflicts_with = "random_agent")]
    pub user_agent: Option<String>,

    /// Pick a random browser User-Agent per request
    #[arg(long)]
    pub random_agent: bool,

    /// Extra headers: "Name: value, Other: value"
    #[arg(long)]
    pub header: Option<String>,

    /// IP-intelligence lookup endpoint
    #[arg(long)]
    pub intel_url: Option<String>,

    /// Directory for exported results [default: data/output]
    #[arg(short, long)]
    pub output_dir: Option<String>,

    /// Export formats: json,csv,txt or all
    #[arg(long)]
    pub output_formats: Option<String>,
}

#[derive(Args, Clone)]
pub struct ValidateArgs {
    /// Config file to validate
    pub config: String,
}
