//! Global Constants
//!
//! Centralized constants for configuration and tuning.
//! All magic numbers and fixed strings should be defined here with documentation.

/// Package-manager CLI constants
pub mod cli {
    /// Default package-manager binary
    pub const DEFAULT_BINARY: &str = "winget";

    /// Verbs the invoker is allowed to run
    pub const ALLOWED_VERBS: &[&str] = &["list", "upgrade", "install", "uninstall", "repair"];

    /// Flags appended to every invocation so the tool never blocks on a prompt
    pub const NON_INTERACTIVE_FLAGS: &[&str] =
        &["--accept-source-agreements", "--disable-interactivity"];

    /// Returned instead of output when a command is rejected by the whitelist
    pub const INVALID_COMMAND_SENTINEL: &str = "Invalid command";

    /// Prefix of the text returned when the process could not be run
    pub const COMMAND_FAILED_PREFIX: &str = "Command failed";

    /// Default time to wait for the package manager (seconds)
    pub const DEFAULT_TIMEOUT_SECS: u64 = 300;
}

/// Package source tags as printed in the `Source` column
pub mod source {
    /// Primary community catalog, used when a row carries no source column
    pub const PRIMARY: &str = "winget";

    /// Microsoft Store catalog
    pub const STORE: &str = "msstore";

    /// Every tag the parser recognizes
    pub const KNOWN: &[&str] = &[PRIMARY, STORE];
}

/// Table parsing constants
pub mod table {
    /// Column label that must open the header line
    pub const NAME_LABEL: &str = "Name";

    /// Identifier column label
    pub const ID_LABEL: &str = "Id";

    /// Version column label
    pub const VERSION_LABEL: &str = "Version";

    /// Minimum fields for an inventory row
    pub const INVENTORY_MIN_FIELDS: usize = 3;

    /// Minimum fields for an upgradable row
    pub const UPGRADABLE_MIN_FIELDS: usize = 4;
}

/// AI provider constants
pub mod provider {
    /// Anthropic messages endpoint base
    pub const ANTHROPIC_API_BASE: &str = "https://api.anthropic.com/v1";

    /// Anthropic protocol version header value
    pub const ANTHROPIC_VERSION: &str = "2023-06-01";

    /// Default Anthropic model
    pub const ANTHROPIC_DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

    /// Perplexity chat-completions endpoint base
    pub const PERPLEXITY_API_BASE: &str = "https://api.perplexity.ai";

    /// Default Perplexity model (web-search augmented)
    pub const PERPLEXITY_DEFAULT_MODEL: &str = "sonar-pro";

    /// Default token budget per analysis
    pub const DEFAULT_MAX_TOKENS: usize = 4096;

    /// Default sampling temperature for the search-augmented provider
    pub const DEFAULT_TEMPERATURE: f32 = 0.2;

    /// Environment fallbacks for credentials
    pub const ANTHROPIC_KEY_ENV: &str = "ANTHROPIC_API_KEY";
    pub const PERPLEXITY_KEY_ENV: &str = "PERPLEXITY_API_KEY";
}

/// Research batch constants
pub mod research {
    /// Default number of provider calls allowed in flight
    pub const DEFAULT_CONCURRENCY: usize = 1;

    /// Upper bound accepted from configuration
    pub const MAX_CONCURRENCY: usize = 8;

    /// Capacity of the progress broadcast channel
    pub const EVENT_CHANNEL_CAPACITY: usize = 256;
}

/// Report file constants
pub mod report {
    /// Default reports directory, relative to the working directory
    pub const DEFAULT_DIR: &str = "reports";

    /// Report file extension
    pub const EXTENSION: &str = "md";

    /// Separates the safe key from the timestamp in a file name
    pub const KEY_SEPARATOR: char = '_';

    /// Sortable timestamp used in file names
    pub const TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S-%3f";

    /// Title line opening every report
    pub const HEADER_TITLE: &str = "# Package Upgrade Analysis Report";

    /// Prefix of the line that starts each package section
    pub const SECTION_MARKER: &str = "## Package: ";

    /// Rule written between package sections
    pub const SECTION_RULE: &str = "---";
}

/// HTTP/Network constants
pub mod network {
    /// Default provider request timeout (seconds)
    pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

    /// Connection timeout (seconds)
    pub const CONNECTION_TIMEOUT_SECS: u64 = 30;
}
