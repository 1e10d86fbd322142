//! Tests for identity resolution.

use super::*;
use crate::config::DefaultProfilerConfig;
use crate::host::{StaticHost, UNKNOWN_HOST};
use crate::id_format::MAX_ID_LENGTH;
use crate::properties::MemoryProperties;

fn config_named(name: &str) -> DefaultProfilerConfig {
    DefaultProfilerConfig::from_properties(&format!("profiler.application.name={}\n", name))
        .unwrap()
}

fn resolve(
    props: &mut MemoryProperties,
    host: &str,
    config: &DefaultProfilerConfig,
) -> (Option<String>, Option<String>) {
    let host = StaticHost(host.to_string());
    let mut resolver = IdResolver::new(props, &host);
    let app = resolver.application_name(config);
    let agent = app.as_deref().and_then(|a| resolver.agent_id(a));
    (app, agent)
}

// ============================================================================
// End-to-end scenarios
// ============================================================================

#[test]
fn test_explicit_properties_are_used() {
    let mut props = MemoryProperties::from_pairs([
        (product::APPLICATION_NAME_KEY, "shop"),
        (product::AGENT_ID_KEY, "shop-01"),
    ]);
    let (app, agent) = resolve(&mut props, "irrelevant", &config_named("ignored"));

    assert_eq!(app.as_deref(), Some("shop"));
    assert_eq!(agent.as_deref(), Some("shop-01"));
}

#[test]
fn test_long_config_name_and_fqdn_host() {
    let mut props = MemoryProperties::new();
    let config = config_named("longapplicationnameexceeding24chars");
    let (app, agent) = resolve(&mut props, "web-server-01.prod.internal", &config);

    assert_eq!(app.as_deref(), Some("longapplicationnameexcee"));
    assert_eq!(app.as_ref().map(String::len), Some(MAX_ID_LENGTH));
    assert_eq!(agent.as_deref(), Some("webserver01longappli"));

    assert_eq!(
        props.get(product::APPLICATION_NAME_KEY).as_deref(),
        Some("longapplicationnameexcee")
    );
    assert_eq!(
        props.get(product::AGENT_ID_KEY).as_deref(),
        Some("webserver01longappli")
    );
}

#[test]
fn test_unknown_host_fallback() {
    let mut props = MemoryProperties::new();
    let (app, agent) = resolve(&mut props, UNKNOWN_HOST, &config_named("shop"));

    assert_eq!(app.as_deref(), Some("shop"));
    assert_eq!(agent.as_deref(), Some("UnknownHostshop"));
}

#[test]
fn test_invalid_explicit_agent_id_falls_back_to_synthesis() {
    let mut props = MemoryProperties::from_pairs([(product::AGENT_ID_KEY, "has space")]);
    let host = StaticHost("host01".to_string());
    let mut resolver = IdResolver::new(&mut props, &host);

    assert_eq!(resolver.agent_id("shop").as_deref(), Some("host01shop"));
}

#[test]
fn test_invalid_agent_id_rejected_by_policy() {
    // The explicit id is rejected and the host cannot yield a legal id either.
    let mut props = MemoryProperties::from_pairs([(product::AGENT_ID_KEY, "has space")]);
    let host = StaticHost("bad host".to_string());
    let mut resolver = IdResolver::new(&mut props, &host);

    assert_eq!(resolver.agent_id("shop"), None);
    // The rejected candidate is still recorded for diagnostics.
    assert_eq!(
        props.get(product::AGENT_ID_KEY).as_deref(),
        Some("bad hostshop")
    );
}

// ============================================================================
// applicationName
// ============================================================================

#[test]
fn test_application_name_is_trimmed() {
    let mut props = MemoryProperties::from_pairs([(product::APPLICATION_NAME_KEY, "  shop \t")]);
    let host = StaticHost("h".to_string());
    let mut resolver = IdResolver::new(&mut props, &host);

    assert_eq!(
        resolver.application_name(&config_named("other")).as_deref(),
        Some("shop")
    );
}

#[test]
fn test_application_name_exactly_max_length_is_kept() {
    let name = "a".repeat(MAX_ID_LENGTH);
    let mut props = MemoryProperties::new();
    let host = StaticHost("h".to_string());
    let mut resolver = IdResolver::new(&mut props, &host);

    assert_eq!(
        resolver.application_name(&config_named(&name)),
        Some(name.clone())
    );
}

#[test]
fn test_application_name_one_over_is_truncated() {
    let name = "b".repeat(MAX_ID_LENGTH + 1);
    let mut props = MemoryProperties::new();
    let host = StaticHost("h".to_string());
    let mut resolver = IdResolver::new(&mut props, &host);

    assert_eq!(
        resolver.application_name(&config_named(&name)),
        Some("b".repeat(MAX_ID_LENGTH))
    );
}

#[test]
fn test_invalid_property_uses_config_default() {
    let mut props = MemoryProperties::from_pairs([(product::APPLICATION_NAME_KEY, "bad name!")]);
    let host = StaticHost("h".to_string());
    let mut resolver = IdResolver::new(&mut props, &host);

    assert_eq!(
        resolver.application_name(&config_named("shop")).as_deref(),
        Some("shop")
    );
    assert_eq!(props.get(product::APPLICATION_NAME_KEY).as_deref(), Some("shop"));
}

#[test]
fn test_application_name_none_without_any_source() {
    let mut props = MemoryProperties::from_pairs([(product::APPLICATION_NAME_KEY, "  ")]);
    let host = StaticHost("h".to_string());
    let mut resolver = IdResolver::new(&mut props, &host);

    assert_eq!(resolver.application_name(&DefaultProfilerConfig::default()), None);
    assert_eq!(resolver.application_name(&config_named("")), None);
    // Nothing was written back.
    assert_eq!(props.get(product::APPLICATION_NAME_KEY).as_deref(), Some("  "));
}

#[test]
fn test_config_default_is_not_sanitized() {
    let mut props = MemoryProperties::new();
    let host = StaticHost("h".to_string());
    let mut resolver = IdResolver::new(&mut props, &host);

    assert_eq!(
        resolver.application_name(&config_named("my shop")).as_deref(),
        Some("my shop")
    );
}

// ============================================================================
// Host normalization
// ============================================================================

#[test]
fn test_host_exactly_max_length_is_verbatim() {
    let host = "abcdefghij-1234";
    assert_eq!(host.len(), MAX_HOSTNAME_LENGTH);
    assert_eq!(normalize_host(host), host);
}

#[test]
fn test_host_over_max_with_dot_takes_prefix() {
    let host = "web-01.corp.intl";
    assert_eq!(host.len(), 16);
    assert_eq!(normalize_host(host), "web01");
}

#[test]
fn test_host_over_max_without_dot_is_filtered() {
    let host = "abcdefghij-12345";
    assert_eq!(host.len(), 16);
    assert_eq!(normalize_host(host), "abcdefghij12345");
}

#[test]
fn test_host_tail_slice_is_retained() {
    assert_eq!(normalize_host("abcdefghijklmnopq"), "cdefghijklmnopq");
    assert_eq!(
        normalize_host("a-very-long-host-name-without-dots"),
        "namewithoutdots"
    );
}

#[test]
fn test_non_ascii_host_is_stripped() {
    assert_eq!(normalize_host("ホスト名-サーバー01"), "01");
    assert_eq!(normalize_host("ホストホストホスト"), "");

    let mut props = MemoryProperties::new();
    let host = StaticHost("ホストホストホスト".to_string());
    let mut resolver = IdResolver::new(&mut props, &host);
    assert_eq!(resolver.agent_id("shop").as_deref(), Some("shop"));
}

#[test]
fn test_app_name_head_is_at_most_nine_units() {
    let mut props = MemoryProperties::new();
    let host = StaticHost("h".to_string());
    let mut resolver = IdResolver::new(&mut props, &host);

    assert_eq!(
        resolver.agent_id("abcdefghijklmnop").as_deref(),
        Some("habcdefghi")
    );
}

// ============================================================================
// Properties
// ============================================================================

#[test]
fn test_synthesized_ids_always_pass_policy() {
    let hosts = [
        "localhost",
        "web-server-01.prod.internal",
        "a-very-long-host-name-without-dots",
        "UPPER.lower.example.com",
        "ホスト名-サーバー01",
        "x",
    ];
    for host in hosts {
        let mut props = MemoryProperties::new();
        let probe = StaticHost(host.to_string());
        let mut resolver = IdResolver::new(&mut props, &probe);
        if let Some(id) = resolver.agent_id("application-name") {
            assert!(
                id_format::is_valid(&id, MAX_ID_LENGTH),
                "host {host:?} produced invalid id {id:?}"
            );
        }
    }
}

#[test]
fn test_second_run_reads_back_written_ids() {
    let mut props = MemoryProperties::new();
    let config = config_named("longapplicationnameexceeding24chars");

    let first = resolve(&mut props, "web-server-01.prod.internal", &config);
    // A different host must not matter once the id has been written.
    let second = resolve(&mut props, "other-host", &config);

    assert_eq!(first, second);
}
