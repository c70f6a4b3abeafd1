use std::fmt;

/// Browser user agents injected when the user does not supply one.
pub const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/115.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/15.1 Safari/605.1.15",
    "Mozilla/5.0 (X11; Linux x86_64) Gecko/20100101 Firefox/102.0",
    "Mozilla/5.0 (iPhone; CPU iPhone OS 16_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.0 Mobile/15E148 Safari/604.1",
];

const SECLISTS: &str = "https://raw.githubusercontent.com/danielmiessler/SecLists/master";

/// Known wordlists that can be fetched on demand, keyed by local file name.
pub const WORDLISTS: &[(&str, &str)] = &[
    (
        "directory-list-2.3-medium.txt",
        "Discovery/Web-Content/directory-list-2.3-medium.txt",
    ),
    ("api-endpoints.txt", "Discovery/Web-Content/api-endpoints.txt"),
    (
        "subdomains-top1mil-5000.txt",
        "Discovery/DNS/subdomains-top1mil-5000.txt",
    ),
    ("file-extensions.txt", "Discovery/Web-Content/file-extensions.txt"),
    ("path-traversal.txt", "Discovery/Web-Content/raft-medium-words.txt"),
    ("origins.txt", "Discovery/Cors/origins.txt"),
    ("js-endpoints.txt", "Discovery/Web-Content/js-endpoints.txt"),
];

pub fn wordlist_url(name: &str) -> Option<String> {
    WORDLISTS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, path)| format!("{SECLISTS}/{path}"))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScanType {
    DirectoryDiscovery,
    ApiDiscovery,
    SubdomainEnumeration,
    FileLeakDetection,
    VhostDiscovery,
    PathTraversal,
    CorsChecks,
    JsEndpoints,
    CustomWordlist,
    Recursive,
}

impl ScanType {
    pub const ALL: [ScanType; 10] = [
        ScanType::DirectoryDiscovery,
        ScanType::ApiDiscovery,
        ScanType::SubdomainEnumeration,
        ScanType::FileLeakDetection,
        ScanType::VhostDiscovery,
        ScanType::PathTraversal,
        ScanType::CorsChecks,
        ScanType::JsEndpoints,
        ScanType::CustomWordlist,
        ScanType::Recursive,
    ];

    /// Parses a 1-based menu choice.
    pub fn from_menu(choice: &str) -> Option<Self> {
        let n: usize = choice.trim().parse().ok()?;
        Self::ALL.get(n.checked_sub(1)?).copied()
    }

    /// Human readable label, also stored as `scan_type` in history.
    pub fn label(self) -> &'static str {
        match self {
            ScanType::DirectoryDiscovery => "Directory & File Discovery",
            ScanType::ApiDiscovery => "API Endpoint Discovery",
            ScanType::SubdomainEnumeration => "Subdomain Enumeration",
            ScanType::FileLeakDetection => "File Leak Detection",
            ScanType::VhostDiscovery => "Virtual Host Discovery",
            ScanType::PathTraversal => "Path Traversal Fuzzing",
            ScanType::CorsChecks => "CORS Misconfiguration Checks",
            ScanType::JsEndpoints => "JavaScript Endpoint Discovery",
            ScanType::CustomWordlist => "Custom Wordlist",
            ScanType::Recursive => "Recursive Scanning",
        }
    }

    pub fn default_wordlist(self) -> Option<&'static str> {
        match self {
            ScanType::DirectoryDiscovery | ScanType::Recursive => {
                Some("directory-list-2.3-medium.txt")
            }
            ScanType::ApiDiscovery => Some("api-endpoints.txt"),
            ScanType::SubdomainEnumeration | ScanType::VhostDiscovery => {
                Some("subdomains-top1mil-5000.txt")
            }
            ScanType::FileLeakDetection => Some("file-extensions.txt"),
            ScanType::PathTraversal => Some("path-traversal.txt"),
            ScanType::CorsChecks => Some("origins.txt"),
            ScanType::JsEndpoints => Some("js-endpoints.txt"),
            ScanType::CustomWordlist => None,
        }
    }

    /// Scan types whose target URL is synthesized from a bare domain.
    pub fn fuzzes_host(self) -> bool {
        matches!(
            self,
            ScanType::SubdomainEnumeration | ScanType::VhostDiscovery
        )
    }

    pub fn is_recursive(self) -> bool {
        self == ScanType::Recursive
    }
}

impl fmt::Display for ScanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Profile {
    pub name: &'static str,
    pub threads: u32,
    pub delay_ms: u64,
    pub auto_calibrate: bool,
}

pub const PROFILES: [Profile; 4] = [
    Profile {
        name: "None",
        threads: 50,
        delay_ms: 0,
        auto_calibrate: false,
    },
    Profile {
        name: "Stealth",
        threads: 10,
        delay_ms: 200,
        auto_calibrate: true,
    },
    Profile {
        name: "Balanced",
        threads: 40,
        delay_ms: 100,
        auto_calibrate: true,
    },
    Profile {
        name: "Fast",
        threads: 100,
        delay_ms: 0,
        auto_calibrate: false,
    },
];

pub const DEFAULT_PROFILE: &str = "3";

/// Looks up a profile by 1-based menu choice, falling back to Balanced.
pub fn profile(choice: &str) -> Profile {
    choice
        .trim()
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| PROFILES.get(i).copied())
        .unwrap_or(PROFILES[2])
}
