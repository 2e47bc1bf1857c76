use crate::metrics::{MetricKind, MetricQuery};
use std::fmt::Display;

/// The metric queries bundled with this crate, in report order.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum QualityMetricName {
    MissingTitle,
    MissingCreator,
    MissingDescription,
    MissingLanguage,
    MissingRights,
    MissingIsShownBy,
    MissingAggregation,
    InvalidLanguageCodes,
    InvalidRightsUris,
    NonstandardDcType,
    LanguagesDistribution,
    CountriesDistribution,
    ProvidersDistribution,
    YearsDistribution,
}

impl QualityMetricName {
    pub fn list_metrics() -> Vec<Self> {
        vec![
            QualityMetricName::MissingTitle,
            QualityMetricName::MissingCreator,
            QualityMetricName::MissingDescription,
            QualityMetricName::MissingLanguage,
            QualityMetricName::MissingRights,
            QualityMetricName::MissingIsShownBy,
            QualityMetricName::MissingAggregation,
            QualityMetricName::InvalidLanguageCodes,
            QualityMetricName::InvalidRightsUris,
            QualityMetricName::NonstandardDcType,
            QualityMetricName::LanguagesDistribution,
            QualityMetricName::CountriesDistribution,
            QualityMetricName::ProvidersDistribution,
            QualityMetricName::YearsDistribution,
        ]
    }

    /// The name used in the metrics report.
    pub fn metric_name(&self) -> &'static str {
        match self {
            QualityMetricName::MissingTitle => "missing_title",
            QualityMetricName::MissingCreator => "missing_creator",
            QualityMetricName::MissingDescription => "missing_description",
            QualityMetricName::MissingLanguage => "missing_language",
            QualityMetricName::MissingRights => "missing_rights",
            QualityMetricName::MissingIsShownBy => "missing_isShownBy",
            QualityMetricName::MissingAggregation => "missing_aggregation",
            QualityMetricName::InvalidLanguageCodes => "invalid_language_codes",
            QualityMetricName::InvalidRightsUris => "invalid_rights_uris",
            QualityMetricName::NonstandardDcType => "nonstandard_dc_type",
            QualityMetricName::LanguagesDistribution => "languages_distribution",
            QualityMetricName::CountriesDistribution => "countries_distribution",
            QualityMetricName::ProvidersDistribution => "providers_distribution",
            QualityMetricName::YearsDistribution => "years_distribution",
        }
    }

    pub fn kind(&self) -> MetricKind {
        match self {
            QualityMetricName::LanguagesDistribution
            | QualityMetricName::CountriesDistribution
            | QualityMetricName::ProvidersDistribution
            | QualityMetricName::YearsDistribution => MetricKind::Distribution,
            _ => MetricKind::Scalar,
        }
    }

    pub fn sparql(&self) -> &'static str {
        match self {
            QualityMetricName::MissingTitle => include_str!("../queries/missing_title.sparql"),
            QualityMetricName::MissingCreator => include_str!("../queries/missing_creator.sparql"),
            QualityMetricName::MissingDescription => {
                include_str!("../queries/missing_description.sparql")
            }
            QualityMetricName::MissingLanguage => {
                include_str!("../queries/missing_language.sparql")
            }
            QualityMetricName::MissingRights => include_str!("../queries/missing_rights.sparql"),
            QualityMetricName::MissingIsShownBy => {
                include_str!("../queries/missing_is_shown_by.sparql")
            }
            QualityMetricName::MissingAggregation => {
                include_str!("../queries/missing_aggregation.sparql")
            }
            QualityMetricName::InvalidLanguageCodes => {
                include_str!("../queries/invalid_language_codes.sparql")
            }
            QualityMetricName::InvalidRightsUris => {
                include_str!("../queries/invalid_rights_uris.sparql")
            }
            QualityMetricName::NonstandardDcType => {
                include_str!("../queries/nonstandard_dc_type.sparql")
            }
            QualityMetricName::LanguagesDistribution => {
                include_str!("../queries/languages_distribution.sparql")
            }
            QualityMetricName::CountriesDistribution => {
                include_str!("../queries/countries_distribution.sparql")
            }
            QualityMetricName::ProvidersDistribution => {
                include_str!("../queries/providers_distribution.sparql")
            }
            QualityMetricName::YearsDistribution => {
                include_str!("../queries/years_distribution.sparql")
            }
        }
    }

    pub fn query(&self) -> MetricQuery {
        MetricQuery::new(self.metric_name(), self.kind(), self.sparql())
    }
}

impl Display for QualityMetricName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.metric_name())
    }
}

/// The completeness, consistency and distribution batteries.
pub fn standard_queries() -> Vec<MetricQuery> {
    QualityMetricName::list_metrics()
        .iter()
        .map(QualityMetricName::query)
        .collect()
}
