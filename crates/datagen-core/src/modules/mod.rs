pub mod elastic;

pub use elastic::{
    AngularDistribution, DiscreteAngles, ElasticSecondaryDistribution,
    ElectronElasticDataEvaluator, EvaluatorError, RutherfordCrossSection,
};
