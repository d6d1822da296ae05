//! Analysis pipeline
//!
//! Drives the per-point stages end to end in two modes: combined metrics
//! over each point's whole buffer, and upstream/downstream metrics split
//! by flow direction. Points are processed in fixed-size batches and a
//! failing point is recorded and skipped, never aborting the run.

use crate::config::AnalysisConfig;
use crate::elevation::elevation_band_mask;
use crate::error::{AnalysisError, Result};
use crate::geometry::circle;
use crate::imagery::{ndvi, ndwi};
use crate::label::{label_halves, propagate_classification, ClassifiedNetwork, LabeledHalves};
use crate::locate::nearest_flowline;
use crate::partition::{closest_vertex_index, partition_vertices};
use crate::record::{FlowMetricRecord, MetricRecord};
use crate::reduce::reduce_mean;
use crate::region::build_regions;
use crate::sources::{ElevationSource, ImagerySource, MonthlyScene};
use crate::split::perpendicular_split;
use castorgis_core::{AnalysisBox, Flowline, Raster, SurveyPoint, WaterwayNetwork};
use chrono::{Months, NaiveDate};
use geo::{BoundingRect, Coord, LineString, Polygon, Rect};
use tracing::{info, warn};

/// Build the circular analysis buffer around each survey point.
pub fn make_boxes(points: &[SurveyPoint], config: &AnalysisConfig) -> Vec<AnalysisBox> {
    points
        .iter()
        .map(|p| {
            let center = Coord {
                x: p.point.x(),
                y: p.point.y(),
            };
            let polygon = circle(center, config.buffer_radius, config.buffer_segments);
            AnalysisBox::new(p, polygon)
        })
        .collect()
}

/// The full flow-direction decomposition around one analysis point
#[derive(Debug, Clone)]
pub struct FlowPartition<'a> {
    /// Main flowline the point was matched to
    pub flowline: &'a Flowline,
    /// Sub-path of the main flowline on the upstream side
    pub upstream_line: LineString<f64>,
    /// Sub-path on the downstream side
    pub downstream_line: LineString<f64>,
    /// Split halves labeled by flow direction
    pub halves: LabeledHalves,
    /// All nearby flowlines classified by flow direction
    pub network: ClassifiedNetwork,
}

/// Decompose the waterway network around a point into upstream and
/// downstream parts.
///
/// Locates the nearest flowline, splits it perpendicular to the channel,
/// partitions its vertices at the closest one, labels the split halves,
/// and classifies the other flowlines within the local area by iterative
/// propagation from the two sub-paths.
pub fn partition_flow<'a>(
    point: geo::Point<f64>,
    network: &'a WaterwayNetwork,
    config: &AnalysisConfig,
) -> Result<FlowPartition<'a>> {
    let nearest = nearest_flowline(point, network, config.search_radius)?;
    let halves = perpendicular_split(&nearest, config)?;

    // Anchor the vertex partition at the exact nearest point, not the
    // bracketing segment's midpoint: when the nearest point lies in the far
    // half of the segment, the far vertex is the split vertex.
    let line = nearest.flowline.line();
    let closest = closest_vertex_index(line, nearest.nearest);
    let partition = partition_vertices(&line.0, closest)?;
    let (upstream_line, downstream_line) = partition.to_lines()?;

    let labeled = label_halves(&halves, &upstream_line, &downstream_line, config)?;

    let others: Vec<LineString<f64>> = network
        .candidates_near(point, config.flow_buffer_radius)
        .into_iter()
        .filter(|f| f.id() != nearest.flowline.id())
        .map(|f| f.line().clone())
        .collect();

    let classified = propagate_classification(
        upstream_line.clone(),
        downstream_line.clone(),
        others,
        config,
    );

    Ok(FlowPartition {
        flowline: nearest.flowline,
        upstream_line,
        downstream_line,
        halves: labeled,
        network: classified,
    })
}

/// A point dropped from the run, with the error that disqualified it
#[derive(Debug)]
pub struct SkippedPoint {
    pub point_id: String,
    pub error: AnalysisError,
}

/// Result of a pipeline run
#[derive(Debug)]
pub struct AnalysisOutput<R> {
    /// One record per surviving point per observation month
    pub records: Vec<R>,
    /// Points dropped with their failure causes
    pub skipped: Vec<SkippedPoint>,
    /// Total flowlines left unclassified across all points
    pub unclassified_segments: usize,
}

fn observation_window(survey_date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = survey_date
        .checked_sub_months(Months::new(6))
        .unwrap_or(survey_date);
    let end = survey_date
        .checked_add_months(Months::new(6))
        .unwrap_or(survey_date);
    (start, end)
}

fn scene_indices(scene: &MonthlyScene) -> Result<(Raster<f64>, Raster<f64>)> {
    Ok((
        ndvi(&scene.nir, &scene.red)?,
        ndwi(&scene.green, &scene.nir)?,
    ))
}

/// Run the combined analysis: one metric record per point per month,
/// averaged over the whole elevation-masked buffer.
pub fn analyze_combined(
    boxes: &[AnalysisBox],
    elevation: &dyn ElevationSource,
    imagery: &dyn ImagerySource,
    config: &AnalysisConfig,
) -> AnalysisOutput<MetricRecord> {
    run_batched(boxes, config, |abox| {
        combined_point(abox, elevation, imagery, config).map(|records| (records, 0))
    })
}

fn combined_point(
    abox: &AnalysisBox,
    elevation: &dyn ElevationSource,
    imagery: &dyn ImagerySource,
    config: &AnalysisConfig,
) -> Result<Vec<MetricRecord>> {
    let mask = elevation_band_mask(
        elevation,
        abox.point,
        &abox.polygon,
        config.combined_band,
        config.optical_scale,
    )?;

    let bounds = polygon_bounds(&abox.polygon)?;
    let (start, end) = observation_window(abox.survey_date);

    let mut records = Vec::new();
    for scene in imagery.monthly_scenes(bounds, start, end) {
        let (ndvi_band, ndwi_band) = scene_indices(&scene)?;
        records.push(MetricRecord {
            point_id: abox.id.clone(),
            status: abox.status,
            year: scene.year,
            month: scene.month,
            ndvi: reduce_mean(&ndvi_band, &mask),
            ndwi: reduce_mean(&ndwi_band, &mask),
            lst: reduce_mean(&scene.lst, &mask),
            et: reduce_mean(&scene.et, &mask),
        });
    }
    Ok(records)
}

/// Run the upstream/downstream analysis: one flow metric record per point
/// per month, with each metric reduced separately over the two flow
/// regions.
pub fn analyze_up_downstream(
    boxes: &[AnalysisBox],
    network: &WaterwayNetwork,
    elevation: &dyn ElevationSource,
    imagery: &dyn ImagerySource,
    config: &AnalysisConfig,
) -> AnalysisOutput<FlowMetricRecord> {
    run_batched(boxes, config, |abox| {
        flow_point(abox, network, elevation, imagery, config)
    })
}

fn flow_point(
    abox: &AnalysisBox,
    network: &WaterwayNetwork,
    elevation: &dyn ElevationSource,
    imagery: &dyn ImagerySource,
    config: &AnalysisConfig,
) -> Result<(Vec<FlowMetricRecord>, usize)> {
    let partition = partition_flow(abox.point, network, config)?;

    let center = Coord {
        x: abox.point.x(),
        y: abox.point.y(),
    };
    let clip = circle(center, config.flow_buffer_radius, config.buffer_segments);
    let mask = elevation_band_mask(
        elevation,
        abox.point,
        &clip,
        config.flow_band,
        config.optical_scale,
    )?;
    let regions = build_regions(&partition.network, &partition.halves, &mask, config)?;

    let bounds = polygon_bounds(&clip)?;
    let (start, end) = observation_window(abox.survey_date);

    let mut records = Vec::new();
    for scene in imagery.monthly_scenes(bounds, start, end) {
        let (ndvi_band, ndwi_band) = scene_indices(&scene)?;
        records.push(FlowMetricRecord {
            point_id: abox.id.clone(),
            status: abox.status,
            year: scene.year,
            month: scene.month,
            ndvi_up: reduce_mean(&ndvi_band, &regions.upstream),
            ndvi_down: reduce_mean(&ndvi_band, &regions.downstream),
            ndwi_up: reduce_mean(&ndwi_band, &regions.upstream),
            ndwi_down: reduce_mean(&ndwi_band, &regions.downstream),
            lst_up: reduce_mean(&scene.lst, &regions.upstream),
            lst_down: reduce_mean(&scene.lst, &regions.downstream),
            et_up: reduce_mean(&scene.et, &regions.upstream),
            et_down: reduce_mean(&scene.et, &regions.downstream),
        });
    }
    Ok((records, partition.network.unclassified))
}

fn polygon_bounds(polygon: &Polygon<f64>) -> Result<Rect<f64>> {
    polygon
        .bounding_rect()
        .ok_or_else(|| AnalysisError::DegenerateGeometry {
            reason: "analysis area has no extent".to_string(),
        })
}

fn run_batched<R>(
    boxes: &[AnalysisBox],
    config: &AnalysisConfig,
    mut per_point: impl FnMut(&AnalysisBox) -> Result<(Vec<R>, usize)>,
) -> AnalysisOutput<R> {
    let mut records = Vec::new();
    let mut skipped = Vec::new();
    let mut unclassified_segments = 0;

    let batches = boxes.chunks(config.batch_size.max(1));
    let total = batches.len();
    for (i, batch) in batches.enumerate() {
        info!(batch = i + 1, total, points = batch.len(), "processing batch");
        for abox in batch {
            match per_point(abox) {
                Ok((mut point_records, unclassified)) => {
                    records.append(&mut point_records);
                    unclassified_segments += unclassified;
                }
                Err(error) => {
                    warn!(point = %abox.id, %error, "skipping point");
                    skipped.push(SkippedPoint {
                        point_id: abox.id.clone(),
                        error,
                    });
                }
            }
        }
    }

    AnalysisOutput {
        records,
        skipped,
        unclassified_segments,
    }
}
