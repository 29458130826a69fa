//! Text to typed value conversion.
//!
//! Used for attribute-like sources and for the inline text of element-like
//! sources whose target is a scalar. Formats are culture-invariant.
use crate::{
    error::ConversionError,
    types::{EnumDefinition, PrimitiveKind, TypeDescription, TypeKind},
    value::Value,
};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use uuid::Uuid;

/// Largest day count a time span may carry.
const MAX_SPAN_DAYS: i64 = 10_675_199;

macro_rules! parse_int {
    ($text:expr, $t:ty) => {{
        let text: &str = $text;
        match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
            Some(hex) => <$t>::from_str_radix(hex, 16).ok(),
            None => text.parse::<$t>().ok(),
        }
    }};
}

/// Converts `text` to a value of type `ty`.
pub fn parse_scalar(text: &str, ty: TypeDescription) -> Result<Value, ConversionError> {
    let invalid = || ConversionError::InvalidFormat {
        type_name: ty.name().to_string(),
        text: text.to_string(),
    };

    match ty.kind() {
        TypeKind::Nullable(inner) => {
            let trimmed = text.trim();
            if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("null") {
                Ok(Value::Null)
            } else {
                parse_scalar(text, *inner)
            }
        }
        TypeKind::Enum(def) => parse_enum(text, ty, def),
        TypeKind::Primitive(kind) => parse_primitive(text, *kind).ok_or_else(invalid),
        TypeKind::Object | TypeKind::Class { .. } | TypeKind::Interface => {
            Err(ConversionError::Unsupported(ty.name().to_string()))
        }
    }
}

fn parse_primitive(text: &str, kind: PrimitiveKind) -> Option<Value> {
    use PrimitiveKind as P;
    let t = text.trim();
    Some(match kind {
        P::String => Value::String(text.to_string()),
        P::Char => {
            let mut chars = text.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Value::Char(c),
                _ => return None,
            }
        }
        P::Boolean => match t {
            "1" => Value::Boolean(true),
            "0" => Value::Boolean(false),
            _ if t.eq_ignore_ascii_case("true") => Value::Boolean(true),
            _ if t.eq_ignore_ascii_case("false") => Value::Boolean(false),
            _ => return None,
        },
        P::SByte => Value::SByte(parse_int!(t, i8)?),
        P::Byte => Value::Byte(parse_int!(t, u8)?),
        P::Int16 => Value::Int16(parse_int!(t, i16)?),
        P::UInt16 => Value::UInt16(parse_int!(t, u16)?),
        P::Int32 => Value::Int32(parse_int!(t, i32)?),
        P::UInt32 => Value::UInt32(parse_int!(t, u32)?),
        P::Int64 => Value::Int64(parse_int!(t, i64)?),
        P::UInt64 => Value::UInt64(parse_int!(t, u64)?),
        P::Single => Value::Single(t.parse().ok()?),
        P::Double => Value::Double(t.parse().ok()?),
        P::Decimal => Value::Decimal(parse_decimal(t.trim_end_matches(['m', 'M']))?),
        P::DateTime => Value::DateTime(parse_date_time(t)?),
        P::Guid => Value::Guid(Uuid::parse_str(t).ok()?),
        P::TimeSpan => Value::TimeSpan(parse_time_span(t)?),
    })
}

fn parse_decimal(text: &str) -> Option<Decimal> {
    Decimal::from_str_exact(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}

fn parse_date_time(text: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_utc());
    }
    for format in [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Parses `[-][d.]hh:mm[:ss[.fffffff]]`, or a bare day count.
pub fn parse_time_span(text: &str) -> Option<Duration> {
    let text = text.trim();
    let (negative, body) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };

    let total = match body.find(':') {
        None => {
            let days = span_component(body)?;
            if days > MAX_SPAN_DAYS {
                return None;
            }
            Duration::try_days(days)?
        }
        Some(colon) => {
            let (days, hours) = match body[..colon].split_once('.') {
                Some((d, h)) => (span_component(d)?, h),
                None => (0, &body[..colon]),
            };
            let hours = span_component(hours)?;
            let mut rest = body[colon + 1..].splitn(2, ':');
            let minutes = span_component(rest.next()?)?;
            let (seconds, nanos) = match rest.next() {
                None => (0, 0),
                Some(s) => match s.split_once('.') {
                    None => (span_component(s)?, 0),
                    Some((whole, fraction)) => {
                        if fraction.is_empty() || fraction.len() > 9 {
                            return None;
                        }
                        let padded = format!("{fraction:0<9}");
                        (span_component(whole)?, span_component(&padded)?)
                    }
                },
            };
            if days > MAX_SPAN_DAYS || hours > 23 || minutes > 59 || seconds > 59 {
                return None;
            }
            let seconds = days
                .checked_mul(86_400)?
                .checked_add(hours * 3_600 + minutes * 60 + seconds)?;
            Duration::try_seconds(seconds)?.checked_add(&Duration::nanoseconds(nanos))?
        }
    };
    Some(if negative { -total } else { total })
}

/// One unsigned run of ASCII digits.
fn span_component(text: &str) -> Option<i64> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

pub fn format_time_span(span: Duration) -> String {
    let negative = span < Duration::zero();
    let span = if negative { -span } else { span };
    let total = span.num_seconds();
    let nanos = (span - Duration::seconds(total))
        .num_nanoseconds()
        .unwrap_or(0);
    let (days, rem) = (total / 86_400, total % 86_400);

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    if days > 0 {
        out.push_str(&format!("{days}."));
    }
    out.push_str(&format!(
        "{:02}:{:02}:{:02}",
        rem / 3_600,
        rem % 3_600 / 60,
        rem % 60
    ));
    if nanos > 0 {
        out.push_str(&format!(".{:07}", nanos / 100));
    }
    out
}

/// Enum text is one or more member names or integers separated by `|`, `,`
/// or the word `or`; the parts are OR-ed together.
fn parse_enum(
    text: &str,
    ty: TypeDescription,
    def: &EnumDefinition,
) -> Result<Value, ConversionError> {
    let mut bits = 0u64;
    let mut any = false;
    let tokens = text
        .split(|c: char| c == '|' || c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty() && !t.eq_ignore_ascii_case("or"));

    for token in tokens {
        any = true;
        let value = def
            .member_value(token)
            .or_else(|| parse_int!(token, u64))
            .or_else(|| token.parse::<i64>().ok().map(|v| v as u64))
            .ok_or_else(|| ConversionError::UnknownEnumMember {
                type_name: ty.name().to_string(),
                member: token.to_string(),
            })?;
        bits |= value;
    }

    if !any {
        return Err(ConversionError::InvalidFormat {
            type_name: ty.name().to_string(),
            text: text.to_string(),
        });
    }
    Ok(Value::Enum(ty, bits))
}

pub fn format_enum(ty: TypeDescription, bits: u64) -> String {
    let Some(def) = ty.enum_definition() else {
        return bits.to_string();
    };
    if let Some((name, _)) = def.members.iter().find(|(_, v)| *v == bits) {
        return name.clone();
    }
    if !def.flags {
        return bits.to_string();
    }

    let mut names = vec![];
    let mut remaining = bits;
    for (name, v) in &def.members {
        if *v != 0 && bits & v == *v && remaining & v != 0 {
            names.push(name.as_str());
            remaining &= !v;
        }
    }
    let mut out = names.join(" | ");
    if remaining != 0 {
        if !out.is_empty() {
            out.push_str(" | ");
        }
        out.push_str(&remaining.to_string());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TypeRegistry;

    #[test]
    fn integers_accept_hex() {
        let reg = TypeRegistry::new();
        let int = reg.primitive(PrimitiveKind::Int32);
        assert_eq!(parse_scalar(" 42 ", int).unwrap(), Value::Int32(42));
        assert_eq!(parse_scalar("0x1F", int).unwrap(), Value::Int32(31));
        assert!(parse_scalar("4.5", int).is_err());
        let byte = reg.primitive(PrimitiveKind::Byte);
        assert!(parse_scalar("256", byte).is_err());
    }

    #[test]
    fn booleans_and_chars() {
        let reg = TypeRegistry::new();
        let b = reg.primitive(PrimitiveKind::Boolean);
        assert_eq!(parse_scalar("TRUE", b).unwrap(), Value::Boolean(true));
        assert_eq!(parse_scalar("0", b).unwrap(), Value::Boolean(false));
        assert!(parse_scalar("yes", b).is_err());

        let c = reg.primitive(PrimitiveKind::Char);
        assert_eq!(parse_scalar(" ", c).unwrap(), Value::Char(' '));
        assert!(parse_scalar("ab", c).is_err());
    }

    #[test]
    fn date_times() {
        let reg = TypeRegistry::new();
        let dt = reg.primitive(PrimitiveKind::DateTime);
        let expected = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(12, 30, 0)
            .unwrap();
        assert_eq!(
            parse_scalar("2024-03-01T12:30:00", dt).unwrap(),
            Value::DateTime(expected)
        );
        assert_eq!(
            parse_scalar("2024-03-01T14:30:00+02:00", dt).unwrap(),
            Value::DateTime(expected)
        );
        assert_eq!(
            parse_scalar("2024-03-01 12:30", dt).unwrap(),
            Value::DateTime(expected)
        );
        assert!(parse_scalar("2024-03-01", dt).is_ok());
        assert!(parse_scalar("yesterday", dt).is_err());
    }

    #[test]
    fn decimals_keep_every_digit() {
        let reg = TypeRegistry::new();
        let d = reg.primitive(PrimitiveKind::Decimal);
        let max = parse_scalar("79228162514264337593543950335", d).unwrap();
        assert_eq!(max, Value::Decimal(Decimal::MAX));
        assert_eq!(max.to_string(), "79228162514264337593543950335m");
        assert_eq!(
            parse_scalar("1234567890.123456789", d).unwrap().to_string(),
            "1234567890.123456789m"
        );
        assert_eq!(
            parse_scalar("2.50m", d).unwrap(),
            Value::Decimal(Decimal::new(250, 2))
        );
        assert_eq!(
            parse_scalar("1.5e3", d).unwrap(),
            Value::Decimal(Decimal::new(1500, 0))
        );
        assert!(parse_scalar("79228162514264337593543950336", d).is_err());
        assert!(parse_scalar("NaN", d).is_err());
    }

    #[test]
    fn guids() {
        let reg = TypeRegistry::new();
        let g = reg.primitive(PrimitiveKind::Guid);
        let a = parse_scalar("67e55044-10b1-426f-9247-bb680e5fe0c8", g).unwrap();
        let b = parse_scalar("{67e55044-10b1-426f-9247-bb680e5fe0c8}", g).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn time_spans() {
        assert_eq!(
            parse_time_span("1.02:03:04.5"),
            Some(
                Duration::days(1)
                    + Duration::hours(2)
                    + Duration::minutes(3)
                    + Duration::seconds(4)
                    + Duration::milliseconds(500)
            )
        );
        assert_eq!(parse_time_span("00:10"), Some(Duration::minutes(10)));
        assert_eq!(parse_time_span("-3"), Some(-Duration::days(3)));
        assert_eq!(parse_time_span("25:00:00"), None);
        assert_eq!(parse_time_span("+00:10"), None);
        assert_eq!(
            format_time_span(Duration::days(1) + Duration::milliseconds(1500)),
            "1.00:00:01.5000000"
        );
        assert_eq!(format_time_span(-Duration::minutes(90)), "-01:30:00");
    }

    #[test]
    fn malformed_time_spans_are_rejected() {
        for text in [
            "00:-99999999999999999",
            "--99999999999999999",
            "-99999999999999999",
            "99999999999999999999",
            "00:00:-1",
            "00:00:01.-5",
            "00:00:01.",
            "1.2.03:00",
            "10675200.00:00",
            ":",
            "",
            "-",
        ] {
            assert_eq!(parse_time_span(text), None, "{text:?}");
        }
        assert!(parse_time_span("10675199.23:59:59.9999999").is_some());
        assert_eq!(parse_time_span("-1.00:00"), Some(-Duration::days(1)));

        let reg = TypeRegistry::new();
        let span = reg.primitive(PrimitiveKind::TimeSpan);
        assert!(matches!(
            parse_scalar("00:-99999999999999999", span),
            Err(ConversionError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn nullable_blank_is_null() {
        let reg = TypeRegistry::new();
        let n = reg.nullable(reg.primitive(PrimitiveKind::Double));
        assert_eq!(parse_scalar("  ", n).unwrap(), Value::Null);
        assert_eq!(parse_scalar("null", n).unwrap(), Value::Null);
        assert_eq!(parse_scalar("1.5", n).unwrap(), Value::Double(1.5));
    }

    #[test]
    fn flag_separators_are_equivalent() {
        let mut reg = TypeRegistry::new();
        let access = reg.enumeration(
            "Demo.Access",
            true,
            [("None", 0), ("Read", 1), ("Write", 2), ("Execute", 4)],
        );
        let piped = parse_scalar("Read | Write", access).unwrap();
        let worded = parse_scalar("Read or Write", access).unwrap();
        let commas = parse_scalar("read,write", access).unwrap();
        assert_eq!(piped, Value::Enum(access, 3));
        assert_eq!(piped, worded);
        assert_eq!(piped, commas);
        assert_eq!(parse_scalar("Read|4", access).unwrap(), Value::Enum(access, 5));
        assert!(matches!(
            parse_scalar("Read or Delete", access),
            Err(ConversionError::UnknownEnumMember { .. })
        ));
        assert_eq!(format_enum(access, 3), "Read | Write");
        assert_eq!(format_enum(access, 0), "None");
    }

    #[test]
    fn objects_are_not_scalars() {
        let mut reg = TypeRegistry::new();
        let ty = reg.class("Demo.Thing").build();
        assert!(matches!(
            parse_scalar("x", ty),
            Err(ConversionError::Unsupported(_))
        ));
    }
}
