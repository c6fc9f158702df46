//! Heuristic request filter.
//!
//! Substring signature matching is a best-effort secondary signal, not a
//! security boundary. It has false positives and negatives by construction
//! and is kept deliberately simple; flagged requests still complete.

/// Client identifier substrings associated with automated tooling.
const SUSPICIOUS_USER_AGENTS: &[&str] = &[
    "bot",
    "crawler",
    "spider",
    "scanner",
    "curl",
    "wget",
    "python-requests",
    "go-http-client",
    "java-http-client",
    "sqlmap",
    "nikto",
    "nmap",
    "burp",
    "zap",
];

const SQL_SIGNATURES: &[&str] = &[
    "union select",
    "drop table",
    "delete from",
    "insert into",
    "update set",
    "alter table",
    "exec(",
    "eval(",
];

const XSS_SIGNATURES: &[&str] = &[
    "<script",
    "javascript:",
    "vbscript:",
    "onload=",
    "onerror=",
    "onclick=",
    "onmouseover=",
];

/// Markup signatures rejected in submitted email/password fields.
pub const MARKUP_SIGNATURES: &[&str] = &[
    "<script",
    "javascript:",
    "vbscript:",
    "onload=",
    "onerror=",
    "<iframe",
    "<object",
    "<embed",
];

/// Endpoints subject to the login throttle.
pub const SENSITIVE_ENDPOINTS: &[&str] = &[
    "/api/auth/login",
    "/api/auth/register",
    "/api/auth/password-reset-request",
];

/// Everything the filter needs to know about one inbound request.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub ip_address: String,
    pub user_agent: Option<String>,
    pub endpoint: String,
    /// Combined textual content of query string, headers, and body.
    pub payload: String,
}

/// A non-blocking observation about a request, logged and then ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flag {
    pub event_type: &'static str,
    pub details: String,
}

/// Outcome of the static filter rules (blocklist, client identifier,
/// payload signatures). The throttle rule needs the ledger and is applied
/// by the middleware on top of this.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Request proceeds; zero or more flags to record.
    Pass(Vec<Flag>),
    /// Request is rejected with a fixed 403 body.
    Block { reason: &'static str },
}

/// Immutable filter configuration, built once from [`crate::config::SecurityConfig`]
/// and passed in explicitly so the rules stay deterministic under test.
#[derive(Debug, Clone, Default)]
pub struct FilterPolicy {
    pub blocked_ips: Vec<String>,
}

impl FilterPolicy {
    #[must_use]
    pub fn new(blocked_ips: Vec<String>) -> Self {
        Self { blocked_ips }
    }

    /// Evaluate the static rules in order. Rule 1 short-circuits into a
    /// block; rules 2 and 3 only accumulate flags.
    #[must_use]
    pub fn inspect(&self, request: &RequestDescriptor) -> Verdict {
        if self.blocked_ips.iter().any(|ip| *ip == request.ip_address) {
            return Verdict::Block {
                reason: "IP address is blocked",
            };
        }

        let mut flags = Vec::new();

        if is_suspicious_user_agent(request.user_agent.as_deref()) {
            flags.push(Flag {
                event_type: "suspicious_user_agent",
                details: format!(
                    "Suspicious client identifier: {}",
                    request.user_agent.as_deref().unwrap_or("<missing>")
                ),
            });
        }

        if let Some(signature) = match_payload_signature(&request.payload) {
            flags.push(Flag {
                event_type: "suspicious_request_pattern",
                details: format!("Request payload matched signature: {signature}"),
            });
        }

        Verdict::Pass(flags)
    }

    #[must_use]
    pub fn is_sensitive_endpoint(endpoint: &str) -> bool {
        SENSITIVE_ENDPOINTS.contains(&endpoint)
    }
}

/// An absent client identifier is itself suspicious.
#[must_use]
pub fn is_suspicious_user_agent(user_agent: Option<&str>) -> bool {
    let Some(user_agent) = user_agent else {
        return true;
    };

    let lowered = user_agent.to_lowercase();
    SUSPICIOUS_USER_AGENTS
        .iter()
        .any(|pattern| lowered.contains(pattern))
}

/// Returns the first matching SQL/XSS signature, if any.
#[must_use]
pub fn match_payload_signature(payload: &str) -> Option<&'static str> {
    let lowered = payload.to_lowercase();

    SQL_SIGNATURES
        .iter()
        .chain(XSS_SIGNATURES.iter())
        .find(|signature| lowered.contains(*signature))
        .copied()
}

/// Field-level markup scan used by registration/login validation.
#[must_use]
pub fn match_markup_signature(value: &str) -> Option<&'static str> {
    let lowered = value.to_lowercase();

    MARKUP_SIGNATURES
        .iter()
        .find(|signature| lowered.contains(*signature))
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(ip: &str, user_agent: Option<&str>, payload: &str) -> RequestDescriptor {
        RequestDescriptor {
            ip_address: ip.to_string(),
            user_agent: user_agent.map(str::to_string),
            endpoint: "/api/auth/login".to_string(),
            payload: payload.to_string(),
        }
    }

    #[test]
    fn test_blocked_ip_blocks() {
        let policy = FilterPolicy::new(vec!["203.0.113.7".to_string()]);
        let verdict = policy.inspect(&descriptor("203.0.113.7", Some("Mozilla/5.0"), ""));

        assert_eq!(
            verdict,
            Verdict::Block {
                reason: "IP address is blocked"
            }
        );
    }

    #[test]
    fn test_clean_request_passes_without_flags() {
        let policy = FilterPolicy::default();
        let verdict = policy.inspect(&descriptor("198.51.100.1", Some("Mozilla/5.0"), "hello"));

        assert_eq!(verdict, Verdict::Pass(vec![]));
    }

    #[test]
    fn test_suspicious_user_agent_flags_but_passes() {
        let policy = FilterPolicy::default();
        let verdict = policy.inspect(&descriptor("198.51.100.1", Some("curl/8.0"), ""));

        let Verdict::Pass(flags) = verdict else {
            panic!("expected pass");
        };
        assert_eq!(flags.len(), 1);
        assert_eq!(flags[0].event_type, "suspicious_user_agent");
    }

    #[test]
    fn test_missing_user_agent_is_suspicious() {
        assert!(is_suspicious_user_agent(None));
        assert!(is_suspicious_user_agent(Some("Googlebot/2.1")));
        assert!(!is_suspicious_user_agent(Some("Mozilla/5.0")));
    }

    #[test]
    fn test_sql_signature_flags_but_passes() {
        let policy = FilterPolicy::default();
        let verdict = policy.inspect(&descriptor(
            "198.51.100.1",
            Some("Mozilla/5.0"),
            "q=1 UNION SELECT password_hash FROM accounts",
        ));

        let Verdict::Pass(flags) = verdict else {
            panic!("expected pass");
        };
        assert_eq!(flags.len(), 1);
        assert_eq!(flags[0].event_type, "suspicious_request_pattern");
        assert!(flags[0].details.contains("union select"));
    }

    #[test]
    fn test_xss_signature_is_case_insensitive() {
        assert_eq!(match_payload_signature("<SCRIPT>alert(1)"), Some("<script"));
        assert_eq!(match_payload_signature("JavaScript:void(0)"), Some("javascript:"));
        assert_eq!(match_payload_signature("plain text"), None);
    }

    #[test]
    fn test_both_flags_can_fire_together() {
        let policy = FilterPolicy::default();
        let verdict = policy.inspect(&descriptor("198.51.100.1", None, "drop table accounts"));

        let Verdict::Pass(flags) = verdict else {
            panic!("expected pass");
        };
        assert_eq!(flags.len(), 2);
    }

    #[test]
    fn test_markup_signature_in_fields() {
        assert!(match_markup_signature("user@<iframe>.com").is_some());
        assert!(match_markup_signature("onerror=alert(1)@x.com").is_some());
        assert!(match_markup_signature("user@example.com").is_none());
    }

    #[test]
    fn test_sensitive_endpoints() {
        assert!(FilterPolicy::is_sensitive_endpoint("/api/auth/login"));
        assert!(FilterPolicy::is_sensitive_endpoint("/api/auth/register"));
        assert!(!FilterPolicy::is_sensitive_endpoint("/api/auth/me"));
    }
}
