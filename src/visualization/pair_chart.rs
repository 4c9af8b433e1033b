use crate::error::Result;
use crate::models::FeatureSample;
use crate::utils::constants::{KDE_GRID_POINTS, PAIR_CHART_CELL};
use crate::visualization::density::{gaussian_kde, padded_range};
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::Path;

const POINT_COLOR: RGBColor = RGBColor(31, 119, 180);
const TITLE_HEIGHT: u32 = 50;

/// Grid of pairwise scatter plots over hour, day, month, lat and lon.
///
/// Off-diagonal cells plot column against row; the diagonal shows a kernel
/// density estimate of that column. Rows with a null in either column of a
/// cell are left out of that cell only.
pub struct PairChart<'a> {
    sample: &'a [FeatureSample],
    labels: bool,
}

impl<'a> PairChart<'a> {
    pub fn new(sample: &'a [FeatureSample]) -> Self {
        Self {
            sample,
            labels: true,
        }
    }

    /// Leave out the title and axes, which need a system font.
    pub fn without_labels(mut self) -> Self {
        self.labels = false;
        self
    }

    /// Non-null values of one column.
    pub fn column(&self, index: usize) -> Vec<f64> {
        self.sample.iter().filter_map(|s| s.value(index)).collect()
    }

    /// Points where both columns are non-null.
    pub fn pairs(&self, x_index: usize, y_index: usize) -> Vec<(f64, f64)> {
        self.sample
            .iter()
            .filter_map(|s| Some((s.value(x_index)?, s.value(y_index)?)))
            .collect()
    }

    /// Pixel size of the whole grid including its title.
    pub fn size() -> (u32, u32) {
        let side = PAIR_CHART_CELL * FeatureSample::COLUMNS.len() as u32;
        (side, side + TITLE_HEIGHT)
    }

    pub fn render(&self, output_path: &Path) -> Result<()> {
        let root = BitMapBackend::new(output_path, Self::size()).into_drawing_area();
        self.draw(&root)?;
        root.present()?;
        Ok(())
    }

    pub fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> Result<()> {
        let columns = FeatureSample::COLUMNS.len();

        root.fill(&WHITE)?;
        let grid = if self.labels {
            root.titled(
                "Relationships between Time and Location Features",
                ("sans-serif", 28).into_font(),
            )?
        } else {
            root.margin(TITLE_HEIGHT, 0, 0, 0)
        };

        let values: Vec<Vec<f64>> = (0..columns).map(|i| self.column(i)).collect();
        let ranges: Vec<(f64, f64)> = values.iter().map(|v| padded_range(v)).collect();

        for (cell, area) in grid.split_evenly((columns, columns)).iter().enumerate() {
            let row = cell / columns;
            let col = cell % columns;
            let labels = CellLabels {
                show: self.labels,
                x: (row == columns - 1).then_some(FeatureSample::COLUMNS[col]),
                y: (col == 0).then_some(FeatureSample::COLUMNS[row]),
            };

            if row == col {
                draw_density(area, &values[col], ranges[col], &labels)?;
            } else {
                draw_scatter(area, &self.pairs(col, row), ranges[col], ranges[row], &labels)?;
            }
        }

        Ok(())
    }
}

struct CellLabels {
    show: bool,
    x: Option<&'static str>,
    y: Option<&'static str>,
}

fn draw_scatter<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    points: &[(f64, f64)],
    x_range: (f64, f64),
    y_range: (f64, f64),
    labels: &CellLabels,
) -> Result<()> {
    let mut chart = cell_builder(area, labels)
        .build_cartesian_2d(x_range.0..x_range.1, y_range.0..y_range.1)?;

    configure_cell_mesh(&mut chart, labels)?;

    chart.draw_series(
        points
            .iter()
            .map(|&(x, y)| Circle::new((x, y), 2, POINT_COLOR.mix(0.3).filled())),
    )?;

    Ok(())
}

fn draw_density<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    values: &[f64],
    range: (f64, f64),
    labels: &CellLabels,
) -> Result<()> {
    let curve = gaussian_kde(values, KDE_GRID_POINTS);

    if curve.is_empty() {
        // Zero spread: mark the single value instead of a curve
        let mut chart =
            cell_builder(area, labels).build_cartesian_2d(range.0..range.1, 0.0..1.0)?;
        configure_cell_mesh(&mut chart, labels)?;

        if let Some(&value) = values.first() {
            chart.draw_series(LineSeries::new(
                vec![(value, 0.0), (value, 1.0)],
                POINT_COLOR.stroke_width(2),
            ))?;
        }
        return Ok(());
    }

    let x_min = curve.first().map_or(range.0, |p| p.0);
    let x_max = curve.last().map_or(range.1, |p| p.0);
    let y_max = curve.iter().map(|p| p.1).fold(0.0, f64::max) * 1.1;

    let mut chart = cell_builder(area, labels).build_cartesian_2d(x_min..x_max, 0.0..y_max)?;
    configure_cell_mesh(&mut chart, labels)?;

    chart.draw_series(
        AreaSeries::new(curve, 0.0, POINT_COLOR.mix(0.3)).border_style(POINT_COLOR),
    )?;

    Ok(())
}

fn cell_builder<'a, 'b, DB: DrawingBackend>(
    area: &'a DrawingArea<DB, Shift>,
    labels: &CellLabels,
) -> ChartBuilder<'a, 'b, DB> {
    let mut builder = ChartBuilder::on(area);
    builder.margin(5);
    if labels.show {
        builder.x_label_area_size(30).y_label_area_size(45);
    }
    builder
}

fn configure_cell_mesh<DB: DrawingBackend>(
    chart: &mut ChartContext<'_, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>,
    labels: &CellLabels,
) -> Result<()> {
    if !labels.show {
        return Ok(());
    }

    let mut mesh = chart.configure_mesh();
    mesh.disable_mesh()
        .x_labels(4)
        .y_labels(4)
        .label_style(("sans-serif", 11));
    if let Some(x) = labels.x {
        mesh.x_desc(x);
    }
    if let Some(y) = labels.y {
        mesh.y_desc(y);
    }
    mesh.draw()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<FeatureSample> {
        vec![
            FeatureSample { hour: 0, day: 1, month: 4, lat: Some(40.7), lon: Some(-74.0) },
            FeatureSample { hour: 13, day: 2, month: 4, lat: None, lon: Some(-73.9) },
            FeatureSample { hour: 17, day: 3, month: 5, lat: Some(40.8), lon: None },
        ]
    }

    #[test]
    fn test_column_skips_nulls() {
        let sample = sample();
        let chart = PairChart::new(&sample);

        assert_eq!(chart.column(0), vec![0.0, 13.0, 17.0]);
        assert_eq!(chart.column(3), vec![40.7, 40.8]);
        assert_eq!(chart.column(4), vec![-74.0, -73.9]);
    }

    #[test]
    fn test_pairs_drop_rows_null_in_either_column() {
        let sample = sample();
        let chart = PairChart::new(&sample);

        assert_eq!(chart.pairs(0, 2), vec![(0.0, 4.0), (13.0, 4.0), (17.0, 5.0)]);
        assert_eq!(chart.pairs(3, 4), vec![(40.7, -74.0)]);
        assert_eq!(chart.pairs(0, 3), vec![(0.0, 40.7), (17.0, 40.8)]);
    }

    #[test]
    fn test_every_off_diagonal_pair_is_plotted() {
        let sample: Vec<FeatureSample> = (0..10u32)
            .map(|i| FeatureSample {
                hour: i,
                day: i + 1,
                month: 4 + i % 3,
                lat: Some(40.7 + i as f64 * 0.01),
                lon: if i == 9 { None } else { Some(-74.0 + i as f64 * 0.01) },
            })
            .collect();
        let chart = PairChart::new(&sample);

        let columns = FeatureSample::COLUMNS.len();
        let expected: usize = (0..columns)
            .flat_map(|row| (0..columns).map(move |col| (row, col)))
            .filter(|(row, col)| row != col)
            .map(|(row, col)| chart.pairs(col, row).len())
            .sum();

        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, PairChart::size()).into_drawing_area();
            PairChart::new(&sample).without_labels().draw(&root).unwrap();
            root.present().unwrap();
        }

        // 12 cells without lon see all ten rows, 8 with lon see nine
        assert_eq!(expected, 12 * 10 + 8 * 9);
        assert_eq!(svg.matches("<circle").count(), expected);
        assert!(!svg.contains("<text"));
    }
}
