use jobcrawl_config::BrowserConfig;
use serde_json::json;
use webdriver::capabilities::Capabilities;

/// Chrome command-line arguments for a crawl session.
pub fn build_chrome_arguments(config: &BrowserConfig) -> Vec<String> {
    let mut args = vec![
        "--no-sandbox".to_string(),
        "--disable-dev-shm-usage".to_string(),
        format!("--user-agent={}", config.user_agent),
    ];
    if config.headless {
        args.push("--headless".to_string());
        args.push("--disable-gpu".to_string());
    }
    args.extend(config.args.iter().cloned());
    args
}

/// WebDriver capabilities requesting a Chrome session with [`build_chrome_arguments`].
pub fn chrome_capabilities(config: &BrowserConfig) -> Capabilities {
    let mut caps = Capabilities::new();
    caps.insert("browserName".to_string(), json!("chrome"));
    caps.insert(
        "goog:chromeOptions".to_string(),
        json!({ "args": build_chrome_arguments(config) }),
    );
    caps
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headless_adds_switches() {
        let config = BrowserConfig::default();
        let args = build_chrome_arguments(&config);

        assert!(args.contains(&"--headless".to_string()));
        assert!(args.contains(&"--no-sandbox".to_string()));
        assert!(args.contains(&"--disable-dev-shm-usage".to_string()));
        assert!(args
            .iter()
            .any(|a| a.starts_with("--user-agent=Mozilla/5.0")));
    }

    #[test]
    fn headed_with_extra_args() {
        let config = BrowserConfig {
            headless: false,
            args: vec!["--window-size=1920,1080".into()],
            ..BrowserConfig::default()
        };
        let args = build_chrome_arguments(&config);

        assert!(!args.contains(&"--headless".to_string()));
        assert_eq!(args.last().map(String::as_str), Some("--window-size=1920,1080"));
    }

    #[test]
    fn capabilities_carry_chrome_options() {
        let caps = chrome_capabilities(&BrowserConfig::default());
        let args = caps["goog:chromeOptions"]["args"].as_array().unwrap();
        assert!(args.iter().any(|a| a == "--headless"));
    }
}
