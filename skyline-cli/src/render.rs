use skyline_core::{ChartConfig, ChartHandle, ChartRenderer};

const BAR_WIDTH: usize = 30;

/// Draws the forecast chart as horizontal block bars, one pair per day.
#[derive(Debug, Default)]
pub struct TerminalChart {
    drawn: usize,
    frame: Option<String>,
}

impl TerminalChart {
    /// Text of the chart currently on screen.
    pub fn frame(&self) -> Option<&str> {
        self.frame.as_deref()
    }
}

#[derive(Debug)]
pub struct TerminalChartHandle {
    id: usize,
}

impl ChartHandle for TerminalChartHandle {
    fn destroy(self) {
        tracing::debug!(chart = self.id, "discarding chart");
    }
}

impl ChartRenderer for TerminalChart {
    type Handle = TerminalChartHandle;

    fn create(&mut self, config: &ChartConfig) -> anyhow::Result<TerminalChartHandle> {
        self.drawn += 1;
        self.frame = Some(draw(config)?);
        Ok(TerminalChartHandle { id: self.drawn })
    }
}

fn bar(value: Option<f64>, max: f64) -> String {
    match value {
        Some(v) if max > 0.0 => {
            let len = ((v.abs() / max) * BAR_WIDTH as f64).round() as usize;
            "█".repeat(len.min(BAR_WIDTH))
        }
        Some(_) => String::new(),
        None => "n/a".to_string(),
    }
}

fn value(v: Option<f64>) -> String {
    v.map(|v| format!("{v:.1}")).unwrap_or_else(|| "-".to_string())
}

/// Renders both series of a two-dataset chart. Temperature bars scale to the
/// largest absolute value; humidity bars scale to 100%.
pub fn draw(config: &ChartConfig) -> anyhow::Result<String> {
    let [temps, humidity] = config.data.datasets.as_slice() else {
        anyhow::bail!(
            "expected a temperature and a humidity series, got {}",
            config.data.datasets.len()
        );
    };

    let temp_max = temps
        .data
        .iter()
        .flatten()
        .fold(0.0_f64, |acc, v| acc.max(v.abs()));
    let label_width = config.labels().iter().map(|l| l.len()).max().unwrap_or(0);

    let mut out = format!("{}  /  {}\n", temps.label, humidity.label);
    for (i, label) in config.labels().iter().enumerate() {
        let t = temps.data.get(i).copied().flatten();
        let h = humidity.data.get(i).copied().flatten();

        out.push_str(&format!(
            "{label:<label_width$}  T {:>6} {}\n",
            value(t),
            bar(t, temp_max)
        ));
        out.push_str(&format!(
            "{:<label_width$}  H {:>6} {}\n",
            "",
            value(h),
            bar(h, 100.0)
        ));
    }

    Ok(out)
}
