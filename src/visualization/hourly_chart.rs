use crate::error::Result;
use crate::models::HourlyAggregate;
use crate::utils::constants::{HOURLY_CHART_SIZE, HOURS_PER_DAY};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::Path;

const BAR_COLOR: RGBColor = RGBColor(135, 206, 235);

/// Bar chart of trip counts per hour of day.
pub struct HourlyChart<'a> {
    aggregate: &'a HourlyAggregate,
    labels: bool,
}

impl<'a> HourlyChart<'a> {
    pub fn new(aggregate: &'a HourlyAggregate) -> Self {
        Self {
            aggregate,
            labels: true,
        }
    }

    /// Leave out the caption and axes, which need a system font.
    pub fn without_labels(mut self) -> Self {
        self.labels = false;
        self
    }

    /// One `(hour, trips)` bar per hour present, ascending.
    pub fn bars(&self) -> Vec<(u32, u64)> {
        self.aggregate
            .counts()
            .iter()
            .map(|count| (count.hour, count.num_trips))
            .collect()
    }

    /// Top of the count axis, 10% above the tallest bar.
    pub fn y_max(&self) -> u64 {
        self.aggregate.max_count().saturating_mul(11) / 10 + 1
    }

    pub fn render(&self, output_path: &Path) -> Result<()> {
        let root = BitMapBackend::new(output_path, HOURLY_CHART_SIZE).into_drawing_area();
        self.draw(&root)?;
        root.present()?;
        Ok(())
    }

    pub fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> Result<()> {
        root.fill(&WHITE)?;

        let last_hour = HOURS_PER_DAY as u32 - 1;

        let mut builder = ChartBuilder::on(root);
        builder.margin(15);
        if self.labels {
            builder
                .caption("Distribution of Trips by Hour of Day", ("sans-serif", 30).into_font())
                .x_label_area_size(50)
                .y_label_area_size(90);
        }
        let mut chart =
            builder.build_cartesian_2d((0u32..last_hour).into_segmented(), 0u64..self.y_max())?;

        if self.labels {
            chart
                .configure_mesh()
                .disable_x_mesh()
                .x_labels(HOURS_PER_DAY)
                .x_desc("Hour of Day")
                .y_desc("Number of Trips")
                .draw()?;
        }

        chart.draw_series(
            Histogram::vertical(&chart)
                .style(BAR_COLOR.filled())
                .margin(4)
                .data(self.bars()),
        )?;

        Ok(())
    }
}
