//! # 缓存 TTL
//!
//! 把调用方给出的 TTL（空、秒数或日历时间间隔）归一化为相对秒数。

use chrono::{DateTime, Days, Local, LocalResult, Months, NaiveDateTime, Offset, TimeDelta, TimeZone};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{CacheError, Result};

/// 日历感知的时间间隔
///
/// 年和月按日历推进（例如 1 月 31 日加一个月落在 2 月末），天按本地
/// 日期推进，时分秒按绝对时长推进。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Interval {
    /// 年
    pub years: u32,
    /// 月
    pub months: u32,
    /// 天（周会折算为天）
    pub days: u32,
    /// 小时
    pub hours: u32,
    /// 分钟
    pub minutes: u32,
    /// 秒
    pub seconds: u32,
}

impl Interval {
    /// 设置年
    #[must_use]
    pub const fn years(mut self, years: u32) -> Self {
        self.years = years;
        self
    }

    /// 设置月
    #[must_use]
    pub const fn months(mut self, months: u32) -> Self {
        self.months = months;
        self
    }

    /// 设置天
    #[must_use]
    pub const fn days(mut self, days: u32) -> Self {
        self.days = days;
        self
    }

    /// 设置小时
    #[must_use]
    pub const fn hours(mut self, hours: u32) -> Self {
        self.hours = hours;
        self
    }

    /// 设置分钟
    #[must_use]
    pub const fn minutes(mut self, minutes: u32) -> Self {
        self.minutes = minutes;
        self
    }

    /// 设置秒
    #[must_use]
    pub const fn seconds(mut self, seconds: u32) -> Self {
        self.seconds = seconds;
        self
    }

    /// 从给定时刻起，该间隔对应的秒数
    ///
    /// 年月日在本地挂钟时间上推进：落在夏令时重叠区间时取较早的时刻，
    /// 落在跳过的区间时按跳过的时长顺延。溢出时返回 `None`。
    pub fn resolve_from<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Option<u64> {
        let months = self.years.checked_mul(12)?.checked_add(self.months)?;
        let clock = i64::from(self.hours) * 3600 + i64::from(self.minutes) * 60 + i64::from(self.seconds);

        let wall = now
            .naive_local()
            .checked_add_months(Months::new(months))?
            .checked_add_days(Days::new(u64::from(self.days)))?;

        let target = anchor(&now.timezone(), wall)?.checked_add_signed(TimeDelta::try_seconds(clock)?)?;

        u64::try_from(target.timestamp() - now.timestamp()).ok()
    }
}

/// 把本地挂钟时间映射回时区中的时刻
fn anchor<Tz: TimeZone>(tz: &Tz, wall: NaiveDateTime) -> Option<DateTime<Tz>> {
    match tz.from_local_datetime(&wall) {
        LocalResult::Single(instant) => Some(instant),
        LocalResult::Ambiguous(earliest, _) => Some(earliest),
        LocalResult::None => {
            // 用跳变前的偏移解释该时间，相当于顺延跳过的时长
            let before = (1..=48).find_map(|hours| {
                let earlier = wall.checked_sub_signed(TimeDelta::try_hours(hours)?)?;
                tz.from_local_datetime(&earlier).earliest()
            })?;
            let offset = i64::from(before.offset().fix().local_minus_utc());
            let utc = wall.checked_sub_signed(TimeDelta::try_seconds(offset)?)?;
            Some(tz.from_utc_datetime(&utc))
        }
    }
}

impl FromStr for Interval {
    type Err = CacheError;

    /// 解析 ISO-8601 时长，例如 `P1M`、`P2W`、`PT90S`、`P1Y2M3DT4H5M6S`
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || CacheError::argument(format!("无效的时间间隔: \"{s}\""));

        let body = s.strip_prefix('P').ok_or_else(invalid)?;
        let mut interval = Self::default();
        let mut in_time = false;
        let mut seen_unit = false;
        let mut digits = String::new();

        for ch in body.chars() {
            if ch.is_ascii_digit() {
                digits.push(ch);
                continue;
            }
            if ch == 'T' && !in_time && digits.is_empty() {
                in_time = true;
                continue;
            }
            if digits.is_empty() {
                return Err(invalid());
            }

            let amount: u32 = digits.parse().map_err(|_| invalid())?;
            digits.clear();
            seen_unit = true;

            match (in_time, ch) {
                (false, 'Y') => interval.years = amount,
                (false, 'M') => interval.months = amount,
                (false, 'W') => {
                    let days = amount.checked_mul(7).ok_or_else(invalid)?;
                    interval.days = interval.days.checked_add(days).ok_or_else(invalid)?;
                }
                (false, 'D') => {
                    interval.days = interval.days.checked_add(amount).ok_or_else(invalid)?;
                }
                (true, 'H') => interval.hours = amount,
                (true, 'M') => interval.minutes = amount,
                (true, 'S') => interval.seconds = amount,
                _ => return Err(invalid()),
            }
        }

        if !digits.is_empty() || !seen_unit {
            return Err(invalid());
        }

        Ok(interval)
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P")?;
        for (amount, unit) in [(self.years, 'Y'), (self.months, 'M'), (self.days, 'D')] {
            if amount > 0 {
                write!(f, "{amount}{unit}")?;
            }
        }
        if self.hours > 0 || self.minutes > 0 || self.seconds > 0 {
            write!(f, "T")?;
            for (amount, unit) in [(self.hours, 'H'), (self.minutes, 'M'), (self.seconds, 'S')] {
                if amount > 0 {
                    write!(f, "{amount}{unit}")?;
                }
            }
        }
        if *self == Self::default() {
            write!(f, "0D")?;
        }
        Ok(())
    }
}

/// 调用方提供的 TTL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Ttl {
    /// 永不过期
    #[default]
    Forever,
    /// 相对秒数，0 同样表示永不过期
    Seconds(u64),
    /// 日历时间间隔
    Interval(Interval),
}

impl Ttl {
    /// 以当前本地时间归一化为秒数
    pub fn resolve(&self) -> Result<u64> {
        self.resolve_at(&Local::now())
    }

    /// 以指定时刻归一化为秒数
    pub fn resolve_at<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Result<u64> {
        match self {
            Self::Forever => Ok(0),
            Self::Seconds(seconds) => Ok(*seconds),
            Self::Interval(interval) => interval
                .resolve_from(now)
                .ok_or_else(|| CacheError::argument(format!("时间间隔超出可表示范围: {interval}"))),
        }
    }
}

impl From<u64> for Ttl {
    fn from(seconds: u64) -> Self {
        Self::Seconds(seconds)
    }
}

impl From<Option<u64>> for Ttl {
    fn from(seconds: Option<u64>) -> Self {
        seconds.map_or(Self::Forever, Self::Seconds)
    }
}

impl From<Duration> for Ttl {
    /// 不足一秒的部分向上取整，非零时长不会变成永不过期
    fn from(duration: Duration) -> Self {
        Self::Seconds(duration.as_secs() + u64::from(duration.subsec_nanos() > 0))
    }
}

impl From<Interval> for Ttl {
    fn from(interval: Interval) -> Self {
        Self::Interval(interval)
    }
}

impl TryFrom<i64> for Ttl {
    type Error = CacheError;

    fn try_from(seconds: i64) -> Result<Self> {
        u64::try_from(seconds)
            .map(Self::Seconds)
            .map_err(|_| CacheError::argument(format!("TTL 不能为负数，但提供了 {seconds}")))
    }
}

impl FromStr for Ttl {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();

        if trimmed.is_empty()
            || trimmed.eq_ignore_ascii_case("null")
            || trimmed.eq_ignore_ascii_case("none")
        {
            return Ok(Self::Forever);
        }

        if trimmed.starts_with('P') {
            return trimmed.parse::<Interval>().map(Self::Interval);
        }

        if let Ok(seconds) = trimmed.parse::<i64>() {
            return Self::try_from(seconds);
        }

        Err(CacheError::argument(format!(
            "TTL 只接受整数、null 和时间间隔，但提供了 \"{trimmed}\""
        )))
    }
}
