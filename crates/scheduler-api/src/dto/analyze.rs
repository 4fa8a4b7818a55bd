use std::collections::HashMap;

use scheduler_selector::{AnalyzeResult, QualityGrade};
use serde::Serialize;

/// `POST /pools/{name}/{partition}/analyze?iterations=N` response (§6).
#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub iterations: u64,
    pub members: HashMap<String, MemberAnalyzeDto>,
    pub overall_statistics: OverallStatisticsDto,
    pub quality_assessment: QualityGrade,
}

#[derive(Debug, Serialize)]
pub struct MemberAnalyzeDto {
    pub theoretical_probability: f64,
    pub actual_probability: f64,
    pub selection_count: u64,
    pub deviation: f64,
    pub deviation_percentage: f64,
}

#[derive(Debug, Serialize)]
pub struct OverallStatisticsDto {
    pub mean_deviation_percentage: f64,
    pub max_deviation_percentage: f64,
    pub min_deviation_percentage: f64,
    pub stddev_deviation_percentage: f64,
}

impl From<AnalyzeResult> for AnalyzeResponse {
    fn from(result: AnalyzeResult) -> Self {
        let members = result
            .per_member
            .into_iter()
            .map(|(key, stats)| {
                (
                    key,
                    MemberAnalyzeDto {
                        theoretical_probability: stats.theoretical_probability,
                        actual_probability: stats.actual_probability,
                        selection_count: stats.selection_count,
                        deviation: stats.deviation,
                        deviation_percentage: stats.deviation_percentage,
                    },
                )
            })
            .collect();

        Self {
            iterations: result.iterations,
            members,
            overall_statistics: OverallStatisticsDto {
                mean_deviation_percentage: result.overall.mean_deviation_percentage,
                max_deviation_percentage: result.overall.max_deviation_percentage,
                min_deviation_percentage: result.overall.min_deviation_percentage,
                stddev_deviation_percentage: result.overall.stddev_deviation_percentage,
            },
            quality_assessment: result.quality,
        }
    }
}
