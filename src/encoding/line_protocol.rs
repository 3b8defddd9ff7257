//! InfluxDB line protocol rendering.
//!
//! `measurement,tag_key=tag_value field_key=field_value[,...] timestamp`
//! with integer fields suffixed by `i`, string fields double-quoted and the
//! timestamp in unix seconds.

use crate::datamodel::{EncodedPoint, ScalarValue};

fn escape_into(output: &mut String, value: &str, special: &[char]) {
    for c in value.chars() {
        if c == '\\' || special.contains(&c) {
            output.push('\\');
        }
        output.push(c);
    }
}

fn push_measurement(output: &mut String, measurement: &str) {
    escape_into(output, measurement, &[',', ' ']);
}

fn push_key(output: &mut String, key: &str) {
    escape_into(output, key, &[',', '=', ' ']);
}

/// Renders the value part of a field, as compared by the dedup cache.
pub fn render_field(value: &ScalarValue) -> String {
    match value {
        ScalarValue::Int(value) => format!("{}i", value),
        ScalarValue::Float(value) => format!("{}", value),
        ScalarValue::Str(value) => {
            let mut output = String::with_capacity(value.len() + 2);
            output.push('"');
            escape_into(&mut output, value, &['"']);
            output.push('"');
            output
        }
    }
}

pub fn render_line(point: &EncodedPoint) -> String {
    let mut line = String::with_capacity(64);
    push_measurement(&mut line, point.measurement());

    for (key, value) in point.tags() {
        line.push(',');
        push_key(&mut line, key);
        line.push('=');
        push_key(&mut line, value);
    }

    for (index, (key, value)) in point.fields().iter().enumerate() {
        line.push(if index == 0 { ' ' } else { ',' });
        push_key(&mut line, key);
        line.push('=');
        line.push_str(&render_field(value));
    }

    line.push(' ');
    line.push_str(&point.timestamp().to_string());
    line
}

/// Renders every point on its own newline-terminated line.
pub fn render_lines(points: &[EncodedPoint]) -> String {
    let mut output = String::with_capacity(points.len() * 64);
    for point in points {
        output.push_str(&render_line(point));
        output.push('\n');
    }
    output
}
