//! Tied scalar weights of one unit

use serde::{Deserialize, Serialize};

/// Parameter slots of a gated unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Parameter {
    Wi,
    Wo,
    Wz,
    Ri,
    Ro,
    Rz,
    Wf,
    Rf,
}

impl Parameter {
    pub const ALL: [Parameter; 8] = [
        Parameter::Wi,
        Parameter::Wo,
        Parameter::Wz,
        Parameter::Ri,
        Parameter::Ro,
        Parameter::Rz,
        Parameter::Wf,
        Parameter::Rf,
    ];

    /// Position in [`Parameter::ALL`]
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Whether the slot belongs to the forget gate
    pub fn is_forget(&self) -> bool {
        matches!(self, Parameter::Wf | Parameter::Rf)
    }
}

/// One scalar per parameter, shared by every time step of a network.
///
/// The same type carries accumulated gradients during backpropagation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GateWeights {
    pub wi: f64,
    pub wo: f64,
    pub wz: f64,
    pub ri: f64,
    pub ro: f64,
    pub rz: f64,
    pub wf: f64,
    pub rf: f64,
}

impl GateWeights {
    /// Every slot set to `value`
    pub fn splat(value: f64) -> Self {
        Self {
            wi: value,
            wo: value,
            wz: value,
            ri: value,
            ro: value,
            rz: value,
            wf: value,
            rf: value,
        }
    }

    pub fn get(&self, parameter: Parameter) -> f64 {
        match parameter {
            Parameter::Wi => self.wi,
            Parameter::Wo => self.wo,
            Parameter::Wz => self.wz,
            Parameter::Ri => self.ri,
            Parameter::Ro => self.ro,
            Parameter::Rz => self.rz,
            Parameter::Wf => self.wf,
            Parameter::Rf => self.rf,
        }
    }

    pub fn get_mut(&mut self, parameter: Parameter) -> &mut f64 {
        match parameter {
            Parameter::Wi => &mut self.wi,
            Parameter::Wo => &mut self.wo,
            Parameter::Wz => &mut self.wz,
            Parameter::Ri => &mut self.ri,
            Parameter::Ro => &mut self.ro,
            Parameter::Rz => &mut self.rz,
            Parameter::Wf => &mut self.wf,
            Parameter::Rf => &mut self.rf,
        }
    }

    /// Multiply every slot by `factor`
    pub fn scaled(mut self, factor: f64) -> Self {
        for p in Parameter::ALL {
            *self.get_mut(p) *= factor;
        }
        self
    }
}
