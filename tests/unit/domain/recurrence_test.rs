// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::Duration;
use schedrs::domain::models::recurrence::{
    CrontabRule, CrontabSpec, IntervalRule, Recurrence, RecurrencePeriod,
};

/// 测试周期单位的字符串往返
///
/// 验证 Display 与 FromStr 对每个单位互为逆操作。
#[test]
fn test_period_string_round_trip() {
    let periods = [
        RecurrencePeriod::Days,
        RecurrencePeriod::Hours,
        RecurrencePeriod::Minutes,
        RecurrencePeriod::Seconds,
        RecurrencePeriod::Microseconds,
    ];

    for period in periods {
        let parsed: RecurrencePeriod = period.to_string().parse().unwrap();
        assert_eq!(parsed, period);
    }
}

/// 测试未知周期单位字符串
#[test]
fn test_period_unknown_string_is_rejected() {
    assert!("fortnights".parse::<RecurrencePeriod>().is_err());
    assert!("Seconds".parse::<RecurrencePeriod>().is_err()); // case sensitive
}

/// 测试默认周期单位为秒
#[test]
fn test_period_defaults_to_seconds() {
    assert_eq!(RecurrencePeriod::default(), RecurrencePeriod::Seconds);
}

/// 测试间隔规则到时间间隔的换算
#[test]
fn test_interval_rule_run_every() {
    let rule = IntervalRule {
        id: 1,
        every: 90,
        period: RecurrencePeriod::Seconds,
    };
    assert_eq!(rule.run_every(), Duration::seconds(90));

    let rule = IntervalRule {
        id: 2,
        every: 3,
        period: RecurrencePeriod::Minutes,
    };
    assert_eq!(rule.run_every(), Duration::minutes(3));

    let rule = IntervalRule {
        id: 3,
        every: 2,
        period: RecurrencePeriod::Days,
    };
    assert_eq!(rule.run_every(), Duration::days(2));

    let rule = IntervalRule {
        id: 4,
        every: 500,
        period: RecurrencePeriod::Microseconds,
    };
    assert_eq!(rule.run_every(), Duration::microseconds(500));
}

/// 测试间隔规则生成的周期描述
#[test]
fn test_interval_rule_recurrence_shape() {
    let rule = IntervalRule {
        id: 1,
        every: 3600,
        period: RecurrencePeriod::Seconds,
    };

    match rule.recurrence() {
        Recurrence::Interval(d) => assert_eq!(d, Duration::seconds(3600)),
        other => panic!("expected interval recurrence, got {:?}", other),
    }
}

/// 测试 crontab 模式组的默认值
#[test]
fn test_crontab_spec_default_is_all_wildcards() {
    let spec = CrontabSpec::default();
    assert_eq!(spec.minute, "*");
    assert_eq!(spec.hour, "*");
    assert_eq!(spec.day_of_week, "*");
    assert_eq!(spec.day_of_month, "*");
    assert_eq!(spec.month_of_year, "*");
    assert_eq!(spec.cron_expression(), "0 * * * * *");
}

/// 测试 crontab 表达式的字段顺序
///
/// cron 库要求的顺序是：秒 分 时 日 月 星期。
#[test]
fn test_crontab_expression_field_order() {
    let spec = CrontabSpec {
        minute: "30".to_string(),
        hour: "4".to_string(),
        day_of_week: "1".to_string(),
        day_of_month: "15".to_string(),
        month_of_year: "6".to_string(),
    };

    assert_eq!(spec.cron_expression(), "0 30 4 15 6 1");
}

/// 测试合法 crontab 模式解析为周期描述
#[test]
fn test_crontab_rule_recurrence_parses() {
    let rule = CrontabRule {
        id: 1,
        spec: CrontabSpec {
            minute: "*/5".to_string(),
            ..Default::default()
        },
    };

    let recurrence = rule.recurrence().unwrap();
    assert!(matches!(recurrence, Recurrence::Crontab(_)));
}

/// 测试非法 crontab 模式返回错误
#[test]
fn test_crontab_rule_invalid_pattern_is_error() {
    let rule = CrontabRule {
        id: 1,
        spec: CrontabSpec {
            minute: "not-a-pattern".to_string(),
            ..Default::default()
        },
    };

    assert!(rule.recurrence().is_err());
}
