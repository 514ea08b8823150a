use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::domain::DomainError;

/// Request budget over a sliding window, e.g. `15/minute`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitRule {
    pub requests: u32,
    pub window: Duration,
}

impl RateLimitRule {
    pub fn new(requests: u32, window: Duration) -> Self {
        Self { requests, window }
    }

    pub fn per_minute(requests: u32) -> Self {
        Self::new(requests, Duration::from_secs(60))
    }

    fn unit_seconds(unit: &str) -> Option<u64> {
        match unit.trim_end_matches('s') {
            "second" | "sec" => Some(1),
            "minute" | "min" => Some(60),
            "hour" => Some(3600),
            "day" => Some(86_400),
            _ => None,
        }
    }

    fn describe_window(&self) -> (u64, &'static str) {
        let secs = self.window.as_secs();

        for (size, name) in [(86_400, "day"), (3600, "hour"), (60, "minute")] {
            if secs >= size && secs % size == 0 {
                return (secs / size, name);
            }
        }

        (secs, "second")
    }
}

impl Default for RateLimitRule {
    fn default() -> Self {
        Self::per_minute(15)
    }
}

impl FromStr for RateLimitRule {
    type Err = DomainError;

    /// Accepts `N/unit`, `N per unit`, `N/M units` and `N per M units`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DomainError::configuration(format!("Invalid rate limit: '{}'", s));
        let normalized = s.trim().to_ascii_lowercase();

        let (count, period) = normalized
            .split_once('/')
            .or_else(|| normalized.split_once(" per "))
            .ok_or_else(invalid)?;

        let requests: u32 = count.trim().parse().map_err(|_| invalid())?;

        if requests == 0 {
            return Err(DomainError::configuration(format!(
                "Rate limit must allow at least one request: '{}'",
                s
            )));
        }

        let mut parts = period.split_whitespace();
        let (multiplier, unit) = match (parts.next(), parts.next(), parts.next()) {
            (Some(unit), None, None) => (1, unit),
            (Some(amount), Some(unit), None) => (amount.parse::<u64>().map_err(|_| invalid())?, unit),
            _ => return Err(invalid()),
        };

        if multiplier == 0 {
            return Err(invalid());
        }

        let seconds = Self::unit_seconds(unit).ok_or_else(invalid)?;

        Ok(Self::new(requests, Duration::from_secs(seconds * multiplier)))
    }
}

impl fmt::Display for RateLimitRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (amount, unit) = self.describe_window();
        let plural = if amount == 1 { "" } else { "s" };

        write!(f, "{} per {} {}{}", self.requests, amount, unit, plural)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_slash_form() {
        let rule: RateLimitRule = "15/minute".parse().unwrap();
        assert_eq!(rule, RateLimitRule::per_minute(15));
    }

    #[test]
    fn test_parse_per_form() {
        let rule: RateLimitRule = "100 per hour".parse().unwrap();
        assert_eq!(rule.requests, 100);
        assert_eq!(rule.window, Duration::from_secs(3600));
    }

    #[test]
    fn test_parse_multiplied_units() {
        let rule: RateLimitRule = "10/30 seconds".parse().unwrap();
        assert_eq!(rule.window, Duration::from_secs(30));

        let rule: RateLimitRule = "5 per 2 days".parse().unwrap();
        assert_eq!(rule.window, Duration::from_secs(172_800));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("fifteen/minute".parse::<RateLimitRule>().is_err());
        assert!("15/fortnight".parse::<RateLimitRule>().is_err());
        assert!("15".parse::<RateLimitRule>().is_err());
        assert!("0/minute".parse::<RateLimitRule>().is_err());
        assert!("5/0 minutes".parse::<RateLimitRule>().is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(RateLimitRule::per_minute(15).to_string(), "15 per 1 minute");
        assert_eq!(
            RateLimitRule::new(3, Duration::from_secs(7200)).to_string(),
            "3 per 2 hours"
        );
        assert_eq!(
            RateLimitRule::new(1, Duration::from_secs(45)).to_string(),
            "1 per 45 seconds"
        );
    }
}
