// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn parse(args: &[&str]) -> anyhow::Result<WatchConfig> {
    let argv = std::iter::once("reloadwatch").chain(args.iter().copied());
    Ok(WatchConfig::try_parse_from(argv)?)
}

#[test]
fn defaults_match_nonce_endpoint() -> anyhow::Result<()> {
    let config = parse(&["--url", "http://localhost:8080"])?;
    config.validate()?;
    assert_eq!(config.path, "/api/nonce");
    assert_eq!(config.interval(), Duration::from_millis(1000));
    assert_eq!(config.timeout(), None);
    assert_eq!(config.max_in_flight, 8);
    assert!(config.http_options().basic_auth.is_none());
    Ok(())
}

#[test]
fn url_is_required() {
    assert!(parse(&[]).is_err());
}

#[test]
fn basic_auth_flows_into_http_options() -> anyhow::Result<()> {
    let config = parse(&[
        "--url",
        "https://metrics.example",
        "--username",
        "admin",
        "--password",
        "hunter2",
        "--timeout-ms",
        "250",
    ])?;
    config.validate()?;
    let opts = config.http_options();
    assert_eq!(opts.basic_auth, Some(("admin".to_owned(), Some("hunter2".to_owned()))));
    assert_eq!(opts.timeout, Some(Duration::from_millis(250)));
    Ok(())
}

#[test]
fn rejects_invalid_settings() {
    let cases: &[(&str, fn(&mut WatchConfig))] = &[
        ("scheme", |c| c.url = "localhost:8080".into()),
        ("ftp scheme", |c| c.url = "ftp://example.com".into()),
        ("empty host", |c| c.url = "http://".into()),
        ("max in flight", |c| c.max_in_flight = 0),
        ("path", |c| c.path = "api/nonce".into()),
        ("interval", |c| c.interval_ms = 0),
        ("timeout", |c| c.timeout_ms = Some(0)),
        ("password", |c| c.password = Some("secret".into())),
        ("actions", |c| {
            c.on_change = Some("true".into());
            c.exit_on_change = true;
        }),
        ("log format", |c| c.log_format = "yaml".into()),
    ];

    for (name, mutate) in cases {
        let mut config = WatchConfig::test("http://127.0.0.1:1");
        mutate(&mut config);
        assert!(config.validate().is_err(), "expected {name} to be rejected");
    }
}

#[test]
fn test_config_is_valid() -> anyhow::Result<()> {
    WatchConfig::test("http://127.0.0.1:1").validate()
}
