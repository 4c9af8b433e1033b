use crate::error::Result;
use crate::models::CoordinateSample;
use crate::utils::constants::OUTLIER_CHART_SIZE;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::Path;

const LAT_COLOR: RGBColor = RGBColor(70, 130, 180);
const LON_COLOR: RGBColor = RGBColor(46, 139, 87);

/// Side-by-side boxplots of latitude and longitude for spotting outliers.
///
/// Null coordinates are left out of the quartiles.
pub struct OutlierChart<'a> {
    sample: &'a [CoordinateSample],
    labels: bool,
}

impl<'a> OutlierChart<'a> {
    pub fn new(sample: &'a [CoordinateSample]) -> Self {
        Self {
            sample,
            labels: true,
        }
    }

    /// Leave out titles and axes, which need a system font.
    pub fn without_labels(mut self) -> Self {
        self.labels = false;
        self
    }

    pub fn latitudes(&self) -> Vec<f64> {
        self.sample.iter().filter_map(|s| s.lat).collect()
    }

    pub fn longitudes(&self) -> Vec<f64> {
        self.sample.iter().filter_map(|s| s.lon).collect()
    }

    pub fn render(&self, output_path: &Path) -> Result<()> {
        let root = BitMapBackend::new(output_path, OUTLIER_CHART_SIZE).into_drawing_area();
        self.draw(&root)?;
        root.present()?;
        Ok(())
    }

    pub fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> Result<()> {
        root.fill(&WHITE)?;

        let panels = root.split_evenly((1, 2));
        let latitude = Panel { title: "Boxplot of Latitude", label: "Lat", color: LAT_COLOR };
        let longitude = Panel { title: "Boxplot of Longitude", label: "Lon", color: LON_COLOR };
        draw_boxplot(&panels[0], &latitude, &self.latitudes(), self.labels)?;
        draw_boxplot(&panels[1], &longitude, &self.longitudes(), self.labels)?;

        Ok(())
    }
}

struct Panel {
    title: &'static str,
    label: &'static str,
    color: RGBColor,
}

fn draw_boxplot<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    panel: &Panel,
    values: &[f64],
    labels: bool,
) -> Result<()> {
    if values.is_empty() {
        return Ok(());
    }

    let quartiles = Quartiles::new(values);
    let [lower_fence, _, _, _, upper_fence] = quartiles.values();

    let (min, max) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    let low = (min as f32).min(lower_fence);
    let high = (max as f32).max(upper_fence);
    let pad = ((high - low) * 0.05).max(0.001);

    let color = panel.color;
    let axis = [panel.label];
    let mut builder = ChartBuilder::on(area);
    builder.margin(15);
    if labels {
        builder
            .caption(panel.title, ("sans-serif", 22).into_font())
            .x_label_area_size(35)
            .y_label_area_size(70);
    }
    let mut chart =
        builder.build_cartesian_2d(axis[..].into_segmented(), (low - pad)..(high + pad))?;

    if labels {
        chart
            .configure_mesh()
            .disable_x_mesh()
            .y_desc(panel.label)
            .draw()?;
    }

    chart.draw_series(std::iter::once(
        Boxplot::new_vertical(SegmentValue::CenterOf(&axis[0]), &quartiles)
            .width(80)
            .whisker_width(0.5)
            .style(color),
    ))?;

    // Points beyond the whiskers
    chart.draw_series(
        values
            .iter()
            .map(|&v| v as f32)
            .filter(|&v| v < lower_fence || v > upper_fence)
            .map(|v| Circle::new((SegmentValue::CenterOf(&axis[0]), v), 3, color.stroke_width(1))),
    )?;

    Ok(())
}
