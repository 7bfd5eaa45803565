use crate::solid::Solid;
use std::sync::Arc;

/// Ordered set of environment components surrounding the sample (containers,
/// gauge volumes). Index order is meaningful and preserved.
pub struct SampleEnvironment {
    components: Vec<Arc<dyn Solid>>,
}

impl SampleEnvironment {
    pub fn new(components: Vec<Arc<dyn Solid>>) -> Self {
        SampleEnvironment { components }
    }
    pub fn components(&self) -> &[Arc<dyn Solid>] {
        &self.components
    }
    pub fn len(&self) -> usize {
        self.components.len()
    }
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

/// The sample under measurement: a shape, an environment, or both.
pub struct Sample {
    pub shape: Option<Arc<dyn Solid>>,
    pub environment: Option<SampleEnvironment>,
}

impl Sample {
    pub fn new(shape: Option<Arc<dyn Solid>>, environment: Option<SampleEnvironment>) -> Self {
        Sample { shape, environment }
    }
    pub fn environment_size(&self) -> usize {
        self.environment.as_ref().map_or(0, |env| env.len())
    }
    /// True when there is anything at all to scatter from.
    pub fn has_geometry(&self) -> bool {
        self.shape.is_some() || self.environment.as_ref().map_or(false, |env| !env.is_empty())
    }
}
