use std::net::Ipv4Addr;

const SLACK_TOKEN: &str = "SLACK_TOKEN";

pub fn get_slack_token() -> Option<String> {
    std::env::var(SLACK_TOKEN).ok().filter(|token| !token.is_empty())
}

const SLACK_VERIFICATION_TOKEN: &str = "SLACK_VERIFICATION_TOKEN";

pub fn get_verification_token() -> Option<String> {
    std::env::var(SLACK_VERIFICATION_TOKEN)
        .ok()
        .filter(|token| !token.is_empty())
}

const SILENT: &str = "SILENT";

/// Any non-empty value other than "0" or "false" enables silent mode.
pub fn is_silent() -> bool {
    std::env::var(SILENT).is_ok_and(|value| is_truthy(&value))
}

fn is_truthy(value: &str) -> bool {
    let value = value.trim();
    !value.is_empty() && value != "0" && !value.eq_ignore_ascii_case("false")
}

const DEFAULT_PORT: u16 = 3000;

pub fn get_default_port() -> u16 {
    DEFAULT_PORT
}

const DEFAULT_ADDR: Ipv4Addr = Ipv4Addr::new(0, 0, 0, 0);

pub fn get_default_addr() -> Ipv4Addr {
    DEFAULT_ADDR
}
