//! Shape and expression parameters of the body model and the sliders
//! editing them.
//!
//! Blendshape evaluation itself belongs to the body model. This module only
//! writes parameter values and asks the model to re-apply them.

use std::ops::RangeInclusive;

pub const NUM_BETAS: usize = 10;
pub const NUM_EXPRESSIONS: usize = 10;

pub const BETA_RANGE: RangeInclusive<f32> = -5.0..=5.0;
pub const EXPRESSION_RANGE: RangeInclusive<f32> = -2.5..=2.5;

/// Parametric body model driven by sliders.
pub trait BodyModel {
    fn beta(&self, index: usize) -> Option<f32>;
    fn expression(&self, index: usize) -> Option<f32>;

    fn set_beta(&mut self, index: usize, value: f32);
    fn set_expression(&mut self, index: usize, value: f32);

    /// Recomputes body shape from current betas.
    fn apply_betas(&mut self);

    /// Recomputes face from current expression weights.
    fn apply_expressions(&mut self);

    /// Moves the body so that its feet rest on the ground plane.
    fn snap_to_ground(&mut self);
}

/// In-memory body parameters.
///
/// Counts how many times each recomputation was requested.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SmplxParams {
    pub betas: [f32; NUM_BETAS],
    pub expressions: [f32; NUM_EXPRESSIONS],
    pub shape_updates: u32,
    pub expression_updates: u32,
    pub ground_snaps: u32,
}

impl BodyModel for SmplxParams {
    fn beta(&self, index: usize) -> Option<f32> {
        self.betas.get(index).copied()
    }

    fn expression(&self, index: usize) -> Option<f32> {
        self.expressions.get(index).copied()
    }

    fn set_beta(&mut self, index: usize, value: f32) {
        if let Some(beta) = self.betas.get_mut(index) {
            *beta = value;
        }
    }

    fn set_expression(&mut self, index: usize, value: f32) {
        if let Some(expression) = self.expressions.get_mut(index) {
            *expression = value;
        }
    }

    fn apply_betas(&mut self) {
        self.shape_updates += 1;
        tracing::trace!("Betas {:?}", self.betas);
    }

    fn apply_expressions(&mut self) {
        self.expression_updates += 1;
        tracing::trace!("Expressions {:?}", self.expressions);
    }

    fn snap_to_ground(&mut self) {
        self.ground_snaps += 1;
    }
}

/// Parameter group edited by a slider bank.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Channel {
    Shape,
    Expression,
}

impl Channel {
    pub fn default_range(&self) -> RangeInclusive<f32> {
        match self {
            Channel::Shape => BETA_RANGE,
            Channel::Expression => EXPRESSION_RANGE,
        }
    }

    pub fn default_count(&self) -> usize {
        match self {
            Channel::Shape => NUM_BETAS,
            Channel::Expression => NUM_EXPRESSIONS,
        }
    }

    fn label(&self, index: usize) -> String {
        match self {
            Channel::Shape => format!("Beta {}", index),
            Channel::Expression => format!("Exp {}", index),
        }
    }
}

/// Identity of a slider, fixed when the slider is created.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SliderId {
    pub channel: Channel,
    pub index: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Slider {
    pub id: SliderId,
    pub label: String,
    pub range: RangeInclusive<f32>,
    pub value: f32,
}

/// Sliders of one channel, one per model parameter.
#[derive(Clone, Debug)]
pub struct SliderBank {
    channel: Channel,
    sliders: Vec<Slider>,
    warned_missing_model: bool,
}

impl SliderBank {
    /// Creates `count` sliders initialized from `model`.
    pub fn new(
        channel: Channel,
        count: usize,
        range: RangeInclusive<f32>,
        model: &dyn BodyModel,
    ) -> Self {
        let sliders = (0..count)
            .map(|index| {
                let current = match channel {
                    Channel::Shape => model.beta(index),
                    Channel::Expression => model.expression(index),
                };

                Slider {
                    id: SliderId { channel, index },
                    label: channel.label(index),
                    range: range.clone(),
                    value: current.unwrap_or(0.0),
                }
            })
            .collect();

        SliderBank {
            channel,
            sliders,
            warned_missing_model: false,
        }
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    pub fn sliders(&self) -> &[Slider] {
        &self.sliders
    }

    pub fn slider(&self, id: SliderId) -> Option<&Slider> {
        if id.channel != self.channel {
            return None;
        }
        self.sliders.get(id.index)
    }

    /// Handles slider movement.
    ///
    /// Value is clamped to the slider range, written to the model and the
    /// model is asked to recompute. Returns stored value.
    pub fn on_value_changed(
        &mut self,
        id: SliderId,
        value: f32,
        model: Option<&mut dyn BodyModel>,
    ) -> Option<f32> {
        let slider = match self.sliders.get_mut(id.index) {
            Some(slider) if id.channel == self.channel => slider,
            _ => {
                tracing::warn!("Unknown slider {:?}", id);
                return None;
            }
        };

        let value = value
            .max(*slider.range.start())
            .min(*slider.range.end());
        slider.value = value;

        let model = match model {
            Some(model) => model,
            None => {
                if !self.warned_missing_model {
                    tracing::error!(
                        "{:?} sliders have no body model assigned",
                        self.channel
                    );
                    self.warned_missing_model = true;
                }
                return Some(value);
            }
        };

        match self.channel {
            Channel::Shape => {
                model.set_beta(id.index, value);
                model.apply_betas();
                model.snap_to_ground();
            }
            Channel::Expression => {
                model.set_expression(id.index, value);
                model.apply_expressions();
            }
        }

        Some(value)
    }
}
