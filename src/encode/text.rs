use crate::metrics::MetricFamily;

pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Renders families in the Prometheus text exposition format.
pub fn render(families: &[MetricFamily]) -> String {
    let mut output = String::new();

    for family in families {
        let name = family.descriptor.name();
        output.push_str(&format!(
            "# HELP {name} {}\n",
            escape_help(&family.descriptor.annotated_help())
        ));
        output.push_str(&format!(
            "# TYPE {name} {}\n",
            family.kind.as_prometheus_type()
        ));

        for sample in &family.samples {
            output.push_str(name);
            let mut labels = sample.labels().peekable();
            if labels.peek().is_some() {
                output.push('{');
                for (index, (key, value)) in labels.enumerate() {
                    if index > 0 {
                        output.push(',');
                    }
                    output.push_str(&format!("{key}=\"{}\"", escape_label_value(value)));
                }
                output.push('}');
            }
            output.push(' ');
            output.push_str(&format_metric_value(sample.value()));
            output.push('\n');
        }
    }

    output
}

fn format_metric_value(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_owned()
    } else if value == f64::INFINITY {
        "+Inf".to_owned()
    } else if value == f64::NEG_INFINITY {
        "-Inf".to_owned()
    } else if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}

fn escape_help(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\n', "\\n")
}

fn escape_label_value(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('\n', "\\n")
        .replace('"', "\\\"")
}
