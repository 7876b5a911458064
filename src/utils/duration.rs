use std::time::Duration;

/// 解析时间字符串（支持 "500ms", "30s", "2m" 以及纯秒数 "10"）
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    let invalid = || format!("Invalid duration: '{}'", s);

    if let Some(ms) = s.strip_suffix("ms") {
        let millis: u64 = ms.trim().parse().map_err(|_| invalid())?;
        Ok(Duration::from_millis(millis))
    } else if let Some(sec) = s.strip_suffix('s') {
        let secs: u64 = sec.trim().parse().map_err(|_| invalid())?;
        Ok(Duration::from_secs(secs))
    } else if let Some(min) = s.strip_suffix('m') {
        let mins: u64 = min.trim().parse().map_err(|_| invalid())?;
        mins.checked_mul(60)
            .map(Duration::from_secs)
            .ok_or_else(invalid)
    } else {
        s.parse::<u64>().map(Duration::from_secs).map_err(|_| {
            format!(
                "Duration must be a number of seconds or end with 'ms', 's' or 'm': '{}'",
                s
            )
        })
    }
}
