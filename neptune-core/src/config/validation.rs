//! Settings checks and environment overrides.

use crate::error::ConfigError;

/// Result of checking a settings tree.
pub type ValidationResult = Result<(), ConfigError>;

/// Collects every problem found in a settings tree, tagged with the
/// table it was found in.
#[derive(Debug, Clone, Default)]
pub struct ValidationContext {
    path: Vec<String>,
    errors: Vec<ConfigError>,
}

impl ValidationContext {
    /// Creates an empty context at the root table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `check` with `section` pushed onto the current path.
    pub fn within(&mut self, section: &str, check: impl FnOnce(&mut Self)) {
        self.path.push(section.to_string());
        check(self);
        self.path.pop();
    }

    /// Dotted path of the table being checked; empty at the root.
    #[must_use]
    pub fn current_path(&self) -> String {
        self.path.join(".")
    }

    /// Records a problem.
    pub fn add_error(&mut self, error: ConfigError) {
        self.errors.push(error);
    }

    /// Problems recorded so far, in discovery order.
    #[must_use]
    pub fn errors(&self) -> &[ConfigError] {
        &self.errors
    }

    /// Reports the first problem found.
    pub fn into_result(self) -> ValidationResult {
        self.errors.into_iter().next().map_or(Ok(()), Err)
    }

    /// `field` is absent from the current table.
    #[must_use]
    pub fn missing_field(&self, field: &str) -> ConfigError {
        ConfigError::MissingField {
            field: field.to_string(),
            section: (!self.path.is_empty()).then(|| self.current_path()),
        }
    }

    /// `field` of the current table holds an unusable value.
    #[must_use]
    pub fn invalid_value(&self, field: &str, reason: impl Into<String>) -> ConfigError {
        let field = match self.path.last() {
            Some(_) => format!("{}.{field}", self.current_path()),
            None => field.to_string(),
        };
        ConfigError::invalid_value(field, reason)
    }
}

/// Chainable field checks that write into a [`ValidationContext`].
#[derive(Debug)]
pub struct Validator<'a> {
    ctx: &'a mut ValidationContext,
}

impl<'a> Validator<'a> {
    /// Starts checking fields of the context's current table.
    pub fn new(ctx: &'a mut ValidationContext) -> Self {
        Self { ctx }
    }

    /// Blank strings count as missing.
    pub fn non_empty(&mut self, field: &str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            let error = self.ctx.missing_field(field);
            self.ctx.add_error(error);
        }
        self
    }

    /// Port 0 cannot be dialed.
    pub fn port(&mut self, field: &str, value: u16) -> &mut Self {
        self.check(field, value != 0, "Port cannot be 0")
    }

    /// Zero-length timeouts and intervals are rejected.
    pub fn positive_ms(&mut self, field: &str, value: u64) -> &mut Self {
        self.check(field, value > 0, "Duration must be at least 1ms")
    }

    /// Case-insensitive membership in `allowed`.
    pub fn one_of(&mut self, field: &str, value: &str, allowed: &[&str]) -> &mut Self {
        let ok = allowed.iter().any(|a| a.eq_ignore_ascii_case(value));
        self.check(field, ok, &format!("Expected one of {}", allowed.join(", ")))
    }

    /// Records `reason` against `field` unless `ok`.
    pub fn check(&mut self, field: &str, ok: bool, reason: &str) -> &mut Self {
        if !ok {
            let error = self.ctx.invalid_value(field, reason);
            self.ctx.add_error(error);
        }
        self
    }
}

/// Reads `NEPTUNE_*` style overrides. Unset and empty variables leave the
/// target untouched.
///
/// ```rust
/// use neptune_core::config::validation::EnvOverride;
///
/// let mut region = "us-east-1".to_string();
/// EnvOverride::apply_string("NEPTUNE_DOC_UNSET_VAR", &mut region);
/// assert_eq!(region, "us-east-1");
/// ```
pub struct EnvOverride;

impl EnvOverride {
    fn read(name: &str) -> Option<String> {
        std::env::var(name).ok().filter(|v| !v.is_empty())
    }

    /// Replaces `target` with the variable's value.
    pub fn apply_string(name: &str, target: &mut String) {
        if let Some(value) = Self::read(name) {
            *target = value;
        }
    }

    /// Sets `target` to the variable's value.
    pub fn apply_optional_string(name: &str, target: &mut Option<String>) {
        if let Some(value) = Self::read(name) {
            *target = Some(value);
        }
    }

    /// Parses the variable into `target`; unparsable values are ignored.
    pub fn apply_number<T: std::str::FromStr>(name: &str, target: &mut T) {
        if let Some(parsed) = Self::read(name).and_then(|v| v.parse().ok()) {
            *target = parsed;
        }
    }

    /// Accepts true/false, 1/0, yes/no and on/off.
    pub fn apply_bool(name: &str, target: &mut bool) {
        match Self::read(name).map(|v| v.to_ascii_lowercase()).as_deref() {
            Some("true" | "1" | "yes" | "on") => *target = true,
            Some("false" | "0" | "no" | "off") => *target = false,
            _ => {}
        }
    }

    /// Value of the first variable in `names` that is set.
    #[must_use]
    pub fn first_set(names: &[&str]) -> Option<String> {
        names.iter().find_map(|name| Self::read(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_within_scopes_field_names() {
        let mut ctx = ValidationContext::new();
        ctx.within("client", |ctx| {
            assert_eq!(ctx.current_path(), "client");
            let error = ctx.invalid_value("request_timeout_ms", "too small");
            assert!(error.to_string().contains("'client.request_timeout_ms'"));

            let missing = ctx.missing_field("serializer");
            assert_eq!(
                missing,
                ConfigError::missing_field_in_section("serializer", "client")
            );
        });
        assert_eq!(ctx.current_path(), "");
        assert_eq!(
            ctx.invalid_value("port", "x"),
            ConfigError::invalid_value("port", "x")
        );
    }

    #[test]
    fn test_first_error_wins() {
        let mut ctx = ValidationContext::new();
        ctx.within("connection", |ctx| {
            Validator::new(ctx)
                .non_empty("endpoint", "   ")
                .port("port", 0)
                .positive_ms("connect_timeout_ms", 5);
        });
        assert_eq!(ctx.errors().len(), 2);
        assert_eq!(
            ctx.into_result(),
            Err(ConfigError::missing_field_in_section("endpoint", "connection"))
        );
    }

    #[test]
    fn test_one_of_ignores_case() {
        let mut ctx = ValidationContext::new();
        Validator::new(&mut ctx)
            .one_of("format", "JSON", &["json", "pretty"])
            .one_of("level", "loud", &["info", "debug"]);
        assert_eq!(ctx.errors().len(), 1);
        assert!(ctx.errors()[0].to_string().contains("Expected one of info, debug"));
    }

    #[test]
    fn test_unset_variables_are_ignored() {
        let mut use_tls = true;
        EnvOverride::apply_bool("NEPTUNE_TEST_UNSET_USE_TLS", &mut use_tls);
        assert!(use_tls);

        let mut port = 8182u16;
        EnvOverride::apply_number("NEPTUNE_TEST_UNSET_PORT", &mut port);
        assert_eq!(port, 8182);

        assert_eq!(
            EnvOverride::first_set(&["NEPTUNE_TEST_UNSET_A", "NEPTUNE_TEST_UNSET_B"]),
            None
        );
    }
}
