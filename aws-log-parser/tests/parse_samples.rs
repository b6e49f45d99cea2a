// Integration tests against the sample entries from the AWS access log documentation
use aws_log_parser::{
    CoercionError, ErrorPolicy, LogParser, LogType, ParseErrorKind, ParserConfig, Record, Value,
};
use std::io::Write;
use std::net::IpAddr;

const CLOUDFRONT_SHORT: &str = "2019-12-04\t21:02:31\tLAX1\t392\t192.0.2.1\tGET\td111111abcdef8.cloudfront.net\t/index.html\t200\t-\tMozilla/5.0";

const CLOUDFRONT_FULL: &str = "2019-12-04\t21:02:31\tLAX1\t392\t192.0.2.100\tGET\td111111abcdef8.cloudfront.net\t/index.html\t200\t-\tMozilla/5.0%20(Windows%20NT%2010.0;%20Win64;%20x64)%20AppleWebKit/537.36%20(KHTML,%20like%20Gecko)%20Chrome/78.0.3904.108%20Safari/537.36\t-\t-\tHit\tSOX4xwn4XV6Q4rgb7XiVGOHms_BGlTAC4KyHmureZmBNrjGdRLiNIQ==\td111111abcdef8.cloudfront.net\thttps\t23\t0.001\t-\tTLSv1.2\tECDHE-RSA-AES128-GCM-SHA256\tHit\tHTTP/2.0\t-\t-\t11040\t0.001\tHit\ttext/html\t78\t-\t-";

const CLASSIC_HTTP: &str = r#"2015-05-13T23:39:43.945958Z my-loadbalancer 192.168.131.39:2817 10.0.0.1:80 0.000073 0.001048 0.000057 200 200 0 29 "GET http://www.example.com:80/ HTTP/1.1" "curl/7.38.0" - -"#;

const CLASSIC_TCP: &str = r#"2015-05-13T23:39:43.945958Z my-loadbalancer 192.168.131.39:2817 10.0.0.1:80 0.001069 0.000028 0.000041 - - 82 305 "- - - " "-" - -"#;

const ALB_HTTP: &str = r#"http 2018-07-02T22:23:00.186641Z app/my-loadbalancer/50dc6c495c0c9188 192.168.131.39:2817 10.0.0.1:80 0.000 0.001 0.000 200 200 34 366 "GET http://www.example.com:80/ HTTP/1.1" "curl/7.46.0" - - arn:aws:elasticloadbalancing:us-east-2:123456789012:targetgroup/my-targets/73e2d6bc24d8a067 "Root=1-58337262-36d228ad5d99923122bbe354" "-" "-" 0 2018-07-02T22:22:48.364000Z "forward" "-" "-" "10.0.0.1:80" "200" "-" "-" TID_1234abcd5678ef90"#;

const ALB_HTTPS: &str = r#"https 2018-07-02T22:23:00.186641Z app/my-loadbalancer/50dc6c495c0c9188 192.168.131.39:2817 10.0.0.1:80 0.086 0.048 0.037 200 200 0 57 "GET https://www.example.com:443/ HTTP/1.1" "curl/7.46.0" ECDHE-RSA-AES128-GCM-SHA256 TLSv1.2 arn:aws:elasticloadbalancing:us-east-2:123456789012:targetgroup/my-targets/73e2d6bc24d8a067 "Root=1-58337281-1d84f3d73c47ec4e58577259" "www.example.com" "arn:aws:acm:us-east-2:123456789012:certificate/12345678-1234-1234-1234-123456789012" 1 2018-07-02T22:22:48.364000Z "authenticate,forward" "-" "-" "10.0.0.1:80" "200" "-" "-""#;

const NLB_TLS: &str = "tls 2.0 2018-12-20T02:59:40 net/my-network-loadbalancer/c6e77e28c25b2234 g3d4b5e8bb8464cd 72.21.218.154:51341 172.100.100.185:443 5 2 98 246 - arn:aws:acm:us-east-2:671290407336:certificate/2a108f19-aded-46b0-8493-c63eb1ef4a99 - ECDHE-RSA-AES128-SHA tlsv12 - my-network-loadbalancer-c6e77e28c25b2234.elb.us-east-2.amazonaws.com - - - 2018-12-20T02:59:30";

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn parse(log_type: LogType, line: &str) -> Record {
    LogParser::new(log_type)
        .parse_line(line)
        .unwrap_or_else(|e| panic!("{} sample failed: {}", log_type, e))
}

fn str_value(s: &str) -> Value {
    Value::Str(s.to_string())
}

#[test]
fn test_cloudfront_short_line() {
    let record = parse(LogType::CloudFront, CLOUDFRONT_SHORT);

    assert_eq!(record.len(), 33);
    assert_eq!(record.get("date").unwrap().to_string(), "2019-12-04");
    assert_eq!(record.get("time").unwrap().to_string(), "21:02:31");
    assert_eq!(record.get("edge_location"), Some(&str_value("LAX1")));
    assert_eq!(record.get("bytes"), Some(&Value::Int(392)));
    assert_eq!(record.get("client_ip").unwrap().as_ip(), Some("192.0.2.1".parse().unwrap()));
    assert_eq!(record.get("method"), Some(&str_value("GET")));
    assert_eq!(record.get("status"), Some(&Value::Int(200)));
    assert!(record.get("referer").unwrap().is_absent());
    // Columns beyond the line's end are absent
    assert!(record.get("range_end").unwrap().is_absent());
}

#[test]
fn test_cloudfront_full_line() {
    let record = parse(LogType::CloudFront, CLOUDFRONT_FULL);

    assert_eq!(
        record.get("user_agent").and_then(Value::as_str),
        Some("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/78.0.3904.108 Safari/537.36")
    );
    assert_eq!(record.get("edge_result_type"), Some(&str_value("Hit")));
    assert_eq!(record.get("protocol"), Some(&str_value("https")));
    assert_eq!(record.get("time_taken"), Some(&Value::Float(0.001)));
    assert_eq!(record.get("client_port"), Some(&Value::Int(11040)));
    assert_eq!(record.get("content_type"), Some(&str_value("text/html")));
    assert_eq!(record.get("content_length"), Some(&Value::Int(78)));
    assert!(record.get("uri_query").unwrap().is_absent());
}

#[test]
fn test_classic_http_line() {
    let record = parse(LogType::ClassicLoadBalancer, CLASSIC_HTTP);

    assert_eq!(record.len(), 15);
    let client = record.get("client").and_then(Value::as_host).unwrap();
    assert_eq!(client.ip, "192.168.131.39".parse::<IpAddr>().unwrap());
    assert_eq!(client.port, 2817);
    assert_eq!(record.get("request_processing_time"), Some(&Value::Float(0.000073)));
    assert_eq!(record.get("elb_status_code"), Some(&Value::Int(200)));

    let request = record.get("request").and_then(Value::as_request).unwrap();
    assert_eq!(request.method, "GET");
    assert_eq!(request.url, "http://www.example.com:80/");
    assert_eq!(request.protocol, "HTTP/1.1");
    assert_eq!(record.get("user_agent"), Some(&str_value("curl/7.38.0")));
    assert!(record.get("ssl_cipher").unwrap().is_absent());
}

#[test]
fn test_classic_tcp_line() {
    let record = parse(LogType::ClassicLoadBalancer, CLASSIC_TCP);

    assert!(record.get("elb_status_code").unwrap().is_absent());
    assert!(record.get("request").unwrap().is_absent());
    assert!(record.get("user_agent").unwrap().is_absent());
    assert_eq!(record.get("received_bytes"), Some(&Value::Int(82)));
}

#[test]
fn test_alb_lines() {
    let record = parse(LogType::ApplicationLoadBalancer, ALB_HTTP);
    assert_eq!(record.len(), 31);
    assert_eq!(record.get("type"), Some(&str_value("http")));
    assert_eq!(record.get("matched_rule_priority"), Some(&Value::Int(0)));
    assert_eq!(record.get("actions_executed"), Some(&Value::List(vec!["forward".into()])));
    assert_eq!(record.get("target_port_list"), Some(&Value::List(vec!["10.0.0.1:80".into()])));
    assert!(record.get("domain_name").unwrap().is_absent());
    assert_eq!(record.get("conn_trace_id"), Some(&str_value("TID_1234abcd5678ef90")));
    assert!(record.get("extra").unwrap().is_absent());

    // Older format without conn_trace_id
    let record = parse(LogType::ApplicationLoadBalancer, ALB_HTTPS);
    assert_eq!(record.get("domain_name"), Some(&str_value("www.example.com")));
    assert_eq!(
        record.get("actions_executed"),
        Some(&Value::List(vec!["authenticate".into(), "forward".into()]))
    );
    assert!(record.get("conn_trace_id").unwrap().is_absent());
}

#[test]
fn test_alb_newer_columns_go_to_extra() {
    init_logging();
    let line = format!("{} \"new column\" 42", ALB_HTTP);
    let record = parse(LogType::ApplicationLoadBalancer, &line);
    assert_eq!(
        record.get("extra"),
        Some(&Value::List(vec!["new column".into(), "42".into()]))
    );
    assert_eq!(LogParser::new(LogType::ApplicationLoadBalancer).parse_line(&record.to_line()), Ok(record));
}

#[test]
fn test_nlb_line() {
    let record = parse(LogType::NetworkLoadBalancer, NLB_TLS);

    assert_eq!(record.len(), 23);
    assert_eq!(record.get("version"), Some(&str_value("2.0")));
    assert_eq!(record.get("connection_time"), Some(&Value::Int(5)));
    assert_eq!(record.get("tls_protocol_version"), Some(&str_value("tlsv12")));
    assert!(record.get("alpn_client_preference_list").unwrap().is_absent());
    assert_eq!(
        record.client_ip(),
        Some("72.21.218.154".parse::<IpAddr>().unwrap())
    );
    let created = record.get("tls_connection_creation_time").and_then(Value::as_timestamp);
    assert_eq!(created.map(|ts| ts.timestamp()), Some(1545274770));
}

#[test]
fn test_round_trip() {
    let samples = [
        (LogType::CloudFront, CLOUDFRONT_SHORT),
        (LogType::CloudFront, CLOUDFRONT_FULL),
        (LogType::ClassicLoadBalancer, CLASSIC_HTTP),
        (LogType::ClassicLoadBalancer, CLASSIC_TCP),
        (LogType::ApplicationLoadBalancer, ALB_HTTP),
        (LogType::ApplicationLoadBalancer, ALB_HTTPS),
        (LogType::NetworkLoadBalancer, NLB_TLS),
    ];

    for (log_type, line) in samples {
        let parser = LogParser::new(log_type);
        let record = parser.parse_line(line).unwrap();
        let encoded = record.to_line();
        let reparsed = parser
            .parse_line(&encoded)
            .unwrap_or_else(|e| panic!("{} re-encoded line failed: {}\n{}", log_type, e, encoded));
        assert_eq!(reparsed, record, "{}", log_type);
    }
}

#[test]
fn test_one_token_short() {
    let cases = [
        (LogType::ClassicLoadBalancer, CLASSIC_HTTP, ' '),
        (LogType::NetworkLoadBalancer, NLB_TLS, ' '),
    ];
    for (log_type, line, delimiter) in cases {
        let (shorter, _) = line.rsplit_once(delimiter).unwrap();
        let err = LogParser::new(log_type).parse_line(shorter).unwrap_err();
        assert!(
            matches!(err.kind, ParseErrorKind::FieldCountMismatch { .. }),
            "{}: {:?}",
            log_type,
            err
        );
    }

    let cloudfront: Vec<&str> = CLOUDFRONT_SHORT.split('\t').collect();
    let shorter = cloudfront[..10].join("\t");
    let err = LogParser::new(LogType::CloudFront).parse_line(&shorter).unwrap_err();
    assert_eq!(
        err.kind,
        ParseErrorKind::FieldCountMismatch { expected: "11..=33".into(), found: 10 }
    );
}

#[test]
fn test_malformed_ip_names_field() {
    // The status field is broken too but is never examined
    let line = CLOUDFRONT_SHORT
        .replace("192.0.2.1", "192.0.2.300")
        .replace("\t200\t", "\tabc\t");
    let err = LogParser::new(LogType::CloudFront).parse_line(&line).unwrap_err();

    assert_eq!(err.field(), Some("client_ip"));
    match err.kind {
        ParseErrorKind::Coercion { index, source, .. } => {
            assert_eq!(index, 4);
            assert_eq!(source, CoercionError::Invalid { raw: "192.0.2.300".into(), expected: "IP address" });
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_unterminated_quote() {
    let line = CLASSIC_HTTP.replace("\"curl/7.38.0\" - -", "\"curl/7.38.0 - -");
    let err = LogParser::new(LogType::ClassicLoadBalancer).parse_line(&line).unwrap_err();
    assert!(matches!(err.kind, ParseErrorKind::Tokenize(_)));
}

#[test]
fn test_empty_ssl_cipher_round_trip() {
    let line = ALB_HTTP.replacen("\"curl/7.46.0\" - -", "\"curl/7.46.0\" \"\" -", 1);
    let parser = LogParser::new(LogType::ApplicationLoadBalancer);
    let record = parser.parse_line(&line).unwrap();
    assert_eq!(record.get("ssl_cipher"), Some(&str_value("")));

    let reparsed = parser.parse_line(&record.to_line()).unwrap();
    assert_eq!(reparsed.get("matched_rule_priority"), Some(&Value::Int(0)));
    assert_eq!(reparsed, record);
}

#[test]
fn test_unknown_action_code() {
    let line = ALB_HTTP.replace("\"forward\"", "\"teleport,forward\"");
    let err = LogParser::new(LogType::ApplicationLoadBalancer).parse_line(&line).unwrap_err();
    assert_eq!(err.field(), Some("actions_executed"));
    assert!(matches!(
        err.kind,
        ParseErrorKind::Coercion { source: CoercionError::UnknownEnumValue { ref raw, .. }, .. } if raw == "teleport"
    ));

    let lenient = LogParser::new(LogType::ApplicationLoadBalancer)
        .with_config(ParserConfig::new().with_enum_passthrough(true));
    let record = lenient.parse_line(&line).unwrap();
    assert_eq!(
        record.get("actions_executed"),
        Some(&Value::List(vec!["teleport".into(), "forward".into()]))
    );
}

#[test]
fn test_unknown_status_code() {
    let line = CLASSIC_HTTP.replacen(" 200 200 ", " 200 999 ", 1);
    let err = LogParser::new(LogType::ClassicLoadBalancer).parse_line(&line).unwrap_err();
    assert_eq!(err.field(), Some("backend_status_code"));
    assert!(matches!(
        err.kind,
        ParseErrorKind::Coercion { source: CoercionError::UnknownEnumValue { .. }, .. }
    ));

    let lenient = LogParser::new(LogType::ClassicLoadBalancer)
        .with_config(ParserConfig::new().with_enum_passthrough(true));
    let record = lenient.parse_line(&line).unwrap();
    assert_eq!(record.get("backend_status_code"), Some(&Value::Int(999)));
}

#[test]
fn test_unknown_enum_value() {
    let line = CLOUDFRONT_SHORT.replace("\tGET\t", "\tBREW\t");
    let strict = LogParser::new(LogType::CloudFront);
    let err = strict.parse_line(&line).unwrap_err();
    assert!(matches!(
        err.kind,
        ParseErrorKind::Coercion { source: CoercionError::UnknownEnumValue { .. }, .. }
    ));

    let lenient = LogParser::new(LogType::CloudFront)
        .with_config(ParserConfig::new().with_enum_passthrough(true));
    let record = lenient.parse_line(&line).unwrap();
    assert_eq!(record.get("method"), Some(&str_value("BREW")));
}

#[test]
fn test_error_policies_over_stream() {
    init_logging();
    let lines = vec![CLASSIC_HTTP, "garbage", CLASSIC_TCP];

    let raise = LogParser::new(LogType::ClassicLoadBalancer);
    let results: Vec<_> = raise.parse_log(lines.clone()).collect();
    assert_eq!(results.len(), 2);
    assert!(results[1].is_err());

    let skip = LogParser::new(LogType::ClassicLoadBalancer)
        .with_config(ParserConfig::new().with_error_policy(ErrorPolicy::SkipAndReport));
    let mut records = skip.parse_log(lines.clone());
    assert_eq!(records.by_ref().filter(|r| r.is_ok()).count(), 2);
    assert_eq!(records.report().skipped.len(), 1);
    assert_eq!(records.report().skipped[0].line, "garbage");

    let collect = LogParser::new(LogType::ClassicLoadBalancer)
        .with_config(ParserConfig::new().with_error_policy(ErrorPolicy::Collect));
    let results: Vec<_> = collect.parse_log(lines).collect();
    assert_eq!(results.len(), 3);
    assert!(results[0].is_ok() && results[1].is_err() && results[2].is_ok());
}

#[test]
fn test_parse_file_with_headers() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "#Version: 1.0").unwrap();
    writeln!(file, "#Fields: date time x-edge-location sc-bytes c-ip cs-method cs(Host) cs-uri-stem sc-status cs(Referer) cs(User-Agent)").unwrap();
    writeln!(file, "{}", CLOUDFRONT_SHORT).unwrap();
    writeln!(file, "{}", CLOUDFRONT_FULL).unwrap();

    let parser = LogParser::new(LogType::CloudFront);
    let records: Vec<Record> = parser
        .parse_file(file.path())
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[1].client_ip(), Some("192.0.2.100".parse::<IpAddr>().unwrap()));
}

#[test]
fn test_record_serializes_to_json() {
    let record = parse(LogType::ClassicLoadBalancer, CLASSIC_HTTP);
    let json = serde_json::to_value(&record).unwrap();

    assert_eq!(json["elb"], "my-loadbalancer");
    assert_eq!(json["sent_bytes"], 29);
    assert_eq!(json["request"]["method"], "GET");
    assert!(json["ssl_protocol"].is_null());
}
