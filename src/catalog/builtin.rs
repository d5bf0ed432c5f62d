//! Built-in category definitions.
//!
//! Paths follow the standard macOS layout. On Linux the XDG equivalents are
//! added where a tool keeps its cache somewhere else, so the same catalog
//! stays useful there.

use std::path::{Path, PathBuf};
use std::time::Duration;

use super::{Category, DetectionRule, RiskTier};
use crate::error::Result;
use crate::platform::Platform;

const MB: u64 = 1024 * 1024;
const DAY: Duration = Duration::from_secs(24 * 60 * 60);

// directories where developers usually keep checkouts
const PROJECT_ROOTS: [&str; 6] = ["Documents", "Code", "Projects", "Developer", "repos", "src"];

// deep enough for ~/Code/org/repo/packages/app/node_modules
const PROJECT_DEPTH: usize = 8;

pub(super) fn categories(home: &Path, platform: Platform) -> Result<Vec<Category>> {
    let h = |rel: &str| home.join(rel);
    let paths = |rels: &[&str]| -> Result<Vec<DetectionRule>> {
        rels.iter().map(|rel| DetectionRule::path(h(rel))).collect()
    };
    let in_projects = |pattern: &str| -> Result<Vec<DetectionRule>> {
        PROJECT_ROOTS
            .iter()
            .map(|dir| DetectionRule::glob(h(dir), pattern, PROJECT_DEPTH))
            .collect()
    };

    // tools that follow XDG on linux and ~/Library/Caches on macOS
    let cache_root: PathBuf = match platform {
        Platform::MacOS => h("Library/Caches"),
        Platform::Linux | Platform::Windows | Platform::Unknown => h(".cache"),
    };
    let user_cache = |mac: &str, xdg: &str| -> PathBuf {
        match platform {
            Platform::MacOS => cache_root.join(mac),
            Platform::Linux | Platform::Windows | Platform::Unknown => cache_root.join(xdg),
        }
    };

    let mut categories = vec![
        // safe: regenerates on demand
        Category::new(
            "conda_cache",
            "Conda Package Cache",
            RiskTier::Safe,
            "Cached conda package tarballs from previous installs",
        )
        .with_rules(paths(&[
            "miniconda3/pkgs",
            "anaconda3/pkgs",
            "opt/miniconda3/pkgs",
            "opt/anaconda3/pkgs",
            ".conda/pkgs",
        ])?)
        .with_notes(
            "Packages re-download on next install",
            "Automatic, conda re-downloads packages when needed",
        )
        .with_cleanup_hint("conda clean --all --yes"),

        Category::new("npm_cache", "npm Cache", RiskTier::Safe, "Cached npm packages and logs")
            .with_rules(paths(&[".npm/_cacache", ".npm/_logs"])?)
            .with_notes(
                "Packages re-download on next npm install",
                "Automatic, npm re-downloads packages when needed",
            )
            .with_cleanup_hint("npm cache clean --force"),

        Category::new("yarn_cache", "Yarn Cache", RiskTier::Safe, "Cached yarn packages")
            .with_rule(DetectionRule::path(h(".yarn/cache"))?)
            .with_rule(DetectionRule::path(user_cache("Yarn", "yarn"))?)
            .with_notes(
                "Packages re-download on next yarn install",
                "Automatic, yarn re-downloads packages when needed",
            )
            .with_cleanup_hint("yarn cache clean"),

        Category::new("pip_cache", "pip Cache", RiskTier::Safe, "Cached pip wheels and downloads")
            .with_rule(DetectionRule::path(user_cache("pip", "pip"))?)
            .with_notes(
                "Packages re-download on next pip install",
                "Automatic, pip re-downloads packages when needed",
            )
            .with_cleanup_hint("pip cache purge"),

        Category::new(
            "homebrew_cache",
            "Homebrew Cache",
            RiskTier::Safe,
            "Downloaded Homebrew bottles and casks",
        )
        .with_rule(DetectionRule::path(user_cache("Homebrew", "Homebrew"))?)
        .with_notes(
            "Bottles re-download on next brew install",
            "Automatic, brew re-downloads when needed",
        )
        .with_cleanup_hint("brew cleanup --prune=all"),

        Category::new(
            "chrome_cache",
            "Chrome Cache",
            RiskTier::Safe,
            "Chrome browser cache (not passwords or bookmarks)",
        )
        .with_rules(paths(&[
            "Library/Caches/Google/Chrome",
            "Library/Application Support/Google/Chrome/Default/Cache",
            "Library/Application Support/Google/Chrome/Default/Code Cache",
        ])?)
        .with_notes(
            "Websites load slower on first visit",
            "Automatic, Chrome re-caches as you browse",
        ),

        Category::new("safari_cache", "Safari Cache", RiskTier::Safe, "Safari browser cache")
            .with_rules(paths(&[
                "Library/Caches/com.apple.Safari",
                "Library/Caches/com.apple.Safari.SafeBrowsing",
            ])?)
            .with_notes(
                "Websites load slower on first visit",
                "Automatic, Safari re-caches as you browse",
            ),

        Category::new("firefox_cache", "Firefox Cache", RiskTier::Safe, "Firefox browser cache")
            .with_rule(DetectionRule::path(user_cache("Firefox", "mozilla/firefox"))?)
            .with_notes(
                "Websites load slower on first visit",
                "Automatic, Firefox re-caches as you browse",
            ),

        Category::new(
            "xcode_derived_data",
            "Xcode DerivedData",
            RiskTier::Safe,
            "Xcode build products, indexes and logs",
        )
        .with_rule(DetectionRule::glob(h("Library/Developer/Xcode/DerivedData"), "*", 1)?)
        .with_notes(
            "Next build is a full rebuild",
            "Automatic, Xcode rebuilds on next compile",
        ),

        Category::new("system_logs", "Application Logs", RiskTier::Safe, "Application log files")
            .with_rule(DetectionRule::glob(h("Library/Logs"), "*", 1)?)
            .with_notes(
                "Historical logs are no longer available for debugging",
                "New logs are created automatically",
            ),

        Category::new(
            "application_caches",
            "Application Caches",
            RiskTier::Safe,
            "Per-application cache directories",
        )
        .with_rule(DetectionRule::glob(cache_root.clone(), "*", 1)?)
        .with_min_size(MB)
        .with_notes(
            "Apps may be slower on first launch",
            "Automatic, apps re-create caches as needed",
        ),

        Category::new(
            "slack_cache",
            "Slack Cache",
            RiskTier::Safe,
            "Slack cached media and service worker data",
        )
        .with_rules(paths(&[
            "Library/Application Support/Slack/Cache",
            "Library/Application Support/Slack/Service Worker/CacheStorage",
        ])?)
        .with_notes("Slack re-downloads media on demand", "Automatic"),

        Category::new(
            "vscode_cache",
            "VS Code Cache",
            RiskTier::Safe,
            "VS Code cached data and extension downloads",
        )
        .with_rules(paths(&[
            "Library/Application Support/Code/Cache",
            "Library/Application Support/Code/CachedData",
            "Library/Application Support/Code/CachedExtensionVSIXs",
        ])?)
        .with_notes("Editor start is slower once", "Automatic"),

        Category::new(
            "gradle_cache",
            "Gradle Cache",
            RiskTier::Safe,
            "Gradle dependency and build cache",
        )
        .with_rule(DetectionRule::path(h(".gradle/caches"))?)
        .with_notes("Dependencies re-download on next build", "Automatic on next gradle build"),

        Category::new("maven_cache", "Maven Repository", RiskTier::Safe, "Local Maven repository")
            .with_rule(DetectionRule::path(h(".m2/repository"))?)
            .with_notes("Dependencies re-download on next build", "Automatic on next mvn build")
            .with_cleanup_hint("mvn dependency:purge-local-repository"),

        Category::new(
            "cocoapods_cache",
            "CocoaPods Cache",
            RiskTier::Safe,
            "Downloaded CocoaPods specs and pods",
        )
        .with_rule(DetectionRule::path(user_cache("CocoaPods", "CocoaPods"))?)
        .with_notes("Pods re-download on next install", "Automatic, pod install re-downloads")
        .with_cleanup_hint("pod cache clean --all"),

        Category::new(
            "cargo_cache",
            "Cargo Registry",
            RiskTier::Safe,
            "Downloaded crate sources and git checkouts",
        )
        .with_rules(paths(&[".cargo/registry", ".cargo/git"])?)
        .with_notes("Crates re-download on next build", "Automatic on next cargo build"),

        Category::new(
            "go_cache",
            "Go Module Cache",
            RiskTier::Safe,
            "Go module downloads and build cache",
        )
        .with_rule(DetectionRule::path(h("go/pkg/mod"))?)
        .with_rule(DetectionRule::path(user_cache("go-build", "go-build"))?)
        .with_notes("Modules re-download on next build", "Automatic on next go build")
        .with_cleanup_hint("go clean -modcache"),

        Category::new(
            "dotnet_cache",
            ".NET/NuGet Cache",
            RiskTier::Safe,
            ".NET SDK and NuGet package cache",
        )
        .with_rule(DetectionRule::path(h(".nuget/packages"))?)
        .with_notes("Packages re-download on next build", "Run 'dotnet restore'")
        .with_cleanup_hint("dotnet nuget locals all --clear"),

        // project artifacts found below the usual checkout directories
        Category::new(
            "node_modules",
            "Node Modules",
            RiskTier::Safe,
            "Node.js dependency directories",
        )
        .with_rules(in_projects("node_modules")?)
        .with_min_size(10 * MB)
        .with_notes("Run 'npm install' to restore", "npm install or yarn install"),

        Category::new(
            "python_venvs",
            "Python Virtual Environments",
            RiskTier::Safe,
            "Project-local Python virtual environments",
        )
        .with_rules(in_projects(".venv")?)
        .with_rules(in_projects("venv")?)
        .with_min_size(50 * MB)
        .with_notes(
            "The environment has to be recreated",
            "python -m venv .venv && pip install -r requirements.txt",
        ),

        Category::new(
            "pycache",
            "Python Bytecode Caches",
            RiskTier::Safe,
            "__pycache__ directories",
        )
        .with_rules(in_projects("__pycache__")?)
        .with_min_size(MB)
        .with_notes("Imports are slightly slower once", "Automatic, Python recompiles on import"),

        Category::new(
            "target_dirs",
            "Rust Target Directories",
            RiskTier::Safe,
            "Cargo build output",
        )
        .with_rules(in_projects("target")?)
        .with_min_size(100 * MB)
        .with_notes("Next build is a full rebuild", "cargo build"),

        // review: recoverable, but look first
        Category::new(
            "build_artifacts",
            "Build Output",
            RiskTier::Review,
            "dist and build directories inside projects",
        )
        .with_rules(in_projects("dist")?)
        .with_rules(in_projects("build")?)
        .with_min_size(10 * MB)
        .with_notes(
            "Some build directories hold checked-in or hand-made files",
            "Rebuild with the project's build command",
        ),

        Category::new(
            "xcode_archives",
            "Xcode Archives",
            RiskTier::Review,
            "Archived app builds for App Store submission",
        )
        .with_rule(DetectionRule::glob(h("Library/Developer/Xcode/Archives"), "*", 1)?)
        .with_notes("Old builds cannot be re-submitted without rebuilding", "Rebuild from source"),

        Category::new(
            "xcode_simulators",
            "Xcode Simulators",
            RiskTier::Review,
            "iOS/watchOS/tvOS simulator devices",
        )
        .with_rule(DetectionRule::glob(h("Library/Developer/CoreSimulator/Devices"), "*", 1)?)
        .with_notes("Simulator data and installed apps are lost", "Re-create simulators in Xcode")
        .with_cleanup_hint("xcrun simctl delete unavailable"),

        Category::new("trash", "Trash", RiskTier::Review, "Files in the Trash")
            .with_rule(DetectionRule::path(h(".Trash"))?)
            .with_notes("Deleted files cannot be recovered", "Not recoverable once emptied"),

        Category::new(
            "docker_data",
            "Docker Data",
            RiskTier::Review,
            "Docker Desktop VM disk with images, containers and volumes",
        )
        .with_rule(DetectionRule::path(h("Library/Containers/com.docker.docker/Data/vms"))?)
        .with_notes("Images must be re-pulled and containers rebuilt", "docker pull")
        .with_cleanup_hint("docker system prune -a"),

        Category::new(
            "huggingface_cache",
            "Hugging Face Models",
            RiskTier::Review,
            "Downloaded ML models and datasets",
        )
        .with_rule(DetectionRule::path(h(".cache/huggingface"))?)
        .with_notes("Models re-download on use, which can be slow", "Automatic on next load"),

        Category::new(
            "downloads_old",
            "Old Downloads",
            RiskTier::Review,
            "Files in Downloads untouched for 30 days",
        )
        .with_rule(DetectionRule::glob(h("Downloads"), "*", 1)?)
        .with_min_age(30 * DAY)
        .with_notes("Files are permanently deleted", "Not recoverable, check before deleting"),

        Category::new("ios_backups", "iOS Backups", RiskTier::Review, "iPhone and iPad backups")
            .with_rule(DetectionRule::glob(
                h("Library/Application Support/MobileSync/Backup"),
                "*",
                1,
            )?)
            .with_notes(
                "Devices cannot be restored from these backups",
                "Create a new backup from the device",
            ),

        // risky: reported, never deleted by the executor
        Category::new(
            "mail_downloads",
            "Mail Attachments",
            RiskTier::Risky,
            "Attachments Mail saved when they were opened",
        )
        .with_rule(DetectionRule::path(h(
            "Library/Containers/com.apple.mail/Data/Library/Mail Downloads",
        ))?)
        .with_notes(
            "Attachments not kept elsewhere are lost",
            "Re-open the message if it still exists",
        ),

        Category::new(
            "message_attachments",
            "Messages Attachments",
            RiskTier::Risky,
            "Photos and files received in Messages",
        )
        .with_rule(DetectionRule::path(h("Library/Messages/Attachments"))?)
        .with_notes("Conversation media disappears", "Only from an iCloud or Time Machine backup"),
    ];

    if platform == Platform::MacOS {
        // shared cask cache on intel installs
        if let Some(cat) = categories.iter_mut().find(|c| c.id == "homebrew_cache") {
            cat.rules.push(DetectionRule::path("/usr/local/Caskroom/.cache")?);
        }
    }

    Ok(categories)
}
