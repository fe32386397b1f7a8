use std::{
    fmt::{self, Display},
    io::Write,
    path::{Path, PathBuf},
};

use serde::Serialize;

use crate::{validation::ValidationMetrics, Result};

/// Width of the 95% band in residual standard deviations.
pub const Z_95: f64 = 1.96;

/// A forecast value with its approximate 95% interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ForecastPoint {
    pub step: usize,
    pub prediction: f64,
    pub low_95: f64,
    pub high_95: f64,
}

/// Attaches a normal approximation band to each prediction.
///
/// Steps are numbered from 1.
pub fn forecast_points(predictions: &[f64], residual_std_dev: f64) -> Vec<ForecastPoint> {
    let delta = Z_95 * residual_std_dev;

    predictions
        .iter()
        .enumerate()
        .map(|(i, &prediction)| ForecastPoint {
            step: i + 1,
            prediction,
            low_95: prediction - delta,
            high_95: prediction + delta,
        })
        .collect()
}

/// Writes `points` as CSV with six decimals per value.
pub fn write_forecast<W: Write>(writer: W, points: &[ForecastPoint]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["step", "prediction", "low_95", "high_95"])?;

    for p in points {
        wtr.write_record([
            p.step.to_string(),
            format!("{:.6}", p.prediction),
            format!("{:.6}", p.low_95),
            format!("{:.6}", p.high_95),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Writes `points` to a CSV file at `path`. See [`write_forecast`].
pub fn write_forecast_csv(path: &Path, points: &[ForecastPoint]) -> Result<()> {
    let file = std::fs::File::create(path)?;
    write_forecast(file, points)
}

/// Everything a run reports, printable as JSON or as text.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub data_points: usize,
    pub lag: usize,
    pub training_mse: f64,
    pub residual_std_dev: f64,
    pub last_observed: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_loaded_from: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_saved_to: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationMetrics>,
    pub forecast: Vec<ForecastPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forecast_csv_path: Option<PathBuf>,
}

impl Summary {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Oracle - Future Forecast")?;
        writeln!(f, "Data points      : {}", self.data_points)?;
        writeln!(f, "Lag              : {}", self.lag)?;
        writeln!(f, "Training MSE     : {:.6}", self.training_mse)?;
        writeln!(f, "Residual Std Dev : {:.6}", self.residual_std_dev)?;
        writeln!(f, "Last observed    : {:.4}", self.last_observed)?;
        if let Some(path) = &self.model_loaded_from {
            writeln!(f, "Model loaded     : {}", path.display())?;
        }
        if let Some(path) = &self.model_saved_to {
            writeln!(f, "Model saved      : {}", path.display())?;
        }

        if let Some(v) = &self.validation {
            writeln!(f)?;
            writeln!(f, "Holdout points   : {}", v.count)?;
            writeln!(f, "Validation MAE   : {:.6}", v.mae)?;
            writeln!(f, "Validation RMSE  : {:.6}", v.rmse)?;
            writeln!(f, "Validation MAPE  : {:.4}%", v.mape)?;
        }
        writeln!(f)?;

        for p in &self.forecast {
            writeln!(
                f,
                "t+{} -> {:.4}  (95% range: {:.4} .. {:.4})",
                p.step, p.prediction, p.low_95, p.high_95
            )?;
        }
        if let Some(path) = &self.forecast_csv_path {
            writeln!(f)?;
            writeln!(f, "Saved forecast CSV: {}", path.display())?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn summary() -> Summary {
        Summary {
            data_points: 40,
            lag: 6,
            training_mse: 0.25,
            residual_std_dev: 0.5,
            last_observed: 12.,
            model_loaded_from: None,
            model_saved_to: Some(PathBuf::from("model.json")),
            validation: None,
            forecast: forecast_points(&[13., 14.], 0.5),
            forecast_csv_path: None,
        }
    }

    #[test]
    fn points_are_numbered_with_symmetric_bands() {
        let points = forecast_points(&[10., 12.5], 2.);

        assert_eq!(points.len(), 2);
        assert_eq!(points[0].step, 1);
        assert_eq!(points[1].step, 2);
        assert!((points[1].low_95 - (12.5 - 3.92)).abs() < 1e-12);
        assert!((points[1].high_95 - (12.5 + 3.92)).abs() < 1e-12);
    }

    #[test]
    fn csv_has_header_and_fixed_decimals() {
        let mut buf = Vec::new();
        write_forecast(&mut buf, &forecast_points(&[1.5], 0.25)).unwrap();

        let text = String::from_utf8(buf).unwrap();
        assert_eq!(
            text,
            "step,prediction,low_95,high_95\n1,1.500000,1.010000,1.990000\n"
        );
    }

    #[test]
    fn json_omits_absent_fields() {
        let value: Value = serde_json::from_str(&summary().to_json().unwrap()).unwrap();

        assert_eq!(value["data_points"], 40);
        assert_eq!(value["model_saved_to"], "model.json");
        assert!(value.get("model_loaded_from").is_none());
        assert!(value.get("validation").is_none());
        assert!(value.get("forecast_csv_path").is_none());
        assert_eq!(value["forecast"][1]["step"], 2);
    }

    #[test]
    fn text_lists_every_step() {
        let mut s = summary();
        s.validation = Some(ValidationMetrics {
            count: 3,
            mae: 0.1,
            rmse: 0.2,
            mape: 1.5,
        });
        let text = s.to_string();

        assert!(text.starts_with("Oracle - Future Forecast\n"));
        assert!(text.contains("Model saved      : model.json"));
        assert!(text.contains("Validation MAPE  : 1.5000%"));
        assert!(text.contains("t+1 -> 13.0000  (95% range: 12.0200 .. 13.9800)"));
        assert!(text.contains("t+2 -> 14.0000"));
        assert!(!text.contains("Saved forecast CSV"));
    }
}
