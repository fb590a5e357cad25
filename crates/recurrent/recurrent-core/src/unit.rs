//! One time step of a gated recurrent unit

use crate::activation::{sigmoid, sigmoid_derivative, tanh, tanh_derivative};
use recurrent_spi::{GateVariant, GateWeights};

/// Gate outputs of one forward step
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GateActivations {
    pub input: f64,
    pub output: f64,
    pub candidate: f64,
    pub forget: f64,
}

/// A single step of the unrolled network.
///
/// Both variants share this type; without a forget gate the forget
/// activation is fixed at 1 and its delta stays 0.
#[derive(Debug, Clone, Default)]
pub struct RecurrentUnit {
    variant: GateVariant,
    x: f64,
    target: f64,
    y_prev: f64,
    c_prev: f64,

    // pre-activations
    pre_i: f64,
    pre_o: f64,
    pre_z: f64,
    pre_f: f64,

    gates: GateActivations,
    c: f64,
    y: f64,
    mask: f64,
    error: f64,

    dl_dc: f64,
    del_i: f64,
    del_o: f64,
    del_z: f64,
    del_f: f64,
}

impl RecurrentUnit {
    pub fn new(variant: GateVariant, x: f64, target: f64) -> Self {
        Self {
            variant,
            x,
            target,
            mask: 1.0,
            ..Self::default()
        }
    }

    /// Compute gates, cell state and output. `mask` is the dropout factor
    /// (0 or `1/(1-p)` in training, 1 in inference).
    pub fn forward(&mut self, w: &GateWeights, y_prev: f64, c_prev: f64, mask: f64) {
        self.y_prev = y_prev;
        self.c_prev = c_prev;
        self.mask = mask;

        self.pre_i = w.wi * self.x + w.ri * y_prev;
        self.pre_o = w.wo * self.x + w.ro * y_prev;
        self.pre_z = w.wz * self.x + w.rz * y_prev;

        let forget = if self.variant.has_forget_gate() {
            self.pre_f = w.wf * self.x + w.rf * y_prev;
            sigmoid(self.pre_f)
        } else {
            self.pre_f = 0.0;
            1.0
        };

        self.gates = GateActivations {
            input: sigmoid(self.pre_i),
            output: sigmoid(self.pre_o),
            candidate: tanh(self.pre_z),
            forget,
        };
        self.c = forget * c_prev + self.gates.input * self.gates.candidate;
        self.y = self.gates.output * tanh(self.c) * mask;
        self.error = self.y - self.target;
    }

    /// Backpropagate this step given the cell-state gradient carried in
    /// from the following step
    pub fn backward(&mut self, carried_dc: f64) {
        let g = self.gates;
        let tanh_c = tanh(self.c);

        let dl_dy = self.error * self.mask;
        let dl_do = dl_dy * tanh_c;
        self.dl_dc = dl_dy * g.output * (1.0 - tanh_c * tanh_c) + carried_dc;
        let dl_dz = self.dl_dc * g.input;
        let dl_di = self.dl_dc * g.candidate;

        self.del_i = dl_di * sigmoid_derivative(self.pre_i);
        self.del_o = dl_do * sigmoid_derivative(self.pre_o);
        self.del_z = dl_dz * tanh_derivative(self.pre_z);
        self.del_f = if self.variant.has_forget_gate() {
            self.dl_dc * self.c_prev * sigmoid_derivative(self.pre_f)
        } else {
            0.0
        };
    }

    /// Add this step's weight gradients into `grads`: input weights pair
    /// with `x`, recurrent weights with the previous output.
    pub fn accumulate(&self, grads: &mut GateWeights) {
        grads.wi += self.x * self.del_i;
        grads.wo += self.x * self.del_o;
        grads.wz += self.x * self.del_z;
        grads.ri += self.y_prev * self.del_i;
        grads.ro += self.y_prev * self.del_o;
        grads.rz += self.y_prev * self.del_z;
        if self.variant.has_forget_gate() {
            grads.wf += self.x * self.del_f;
            grads.rf += self.y_prev * self.del_f;
        }
    }

    /// Gradient passed to the preceding step's cell state
    pub fn carried_gradient(&self) -> f64 {
        self.dl_dc * self.gates.forget
    }

    pub fn input(&self) -> f64 {
        self.x
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn output(&self) -> f64 {
        self.y
    }

    pub fn cell_state(&self) -> f64 {
        self.c
    }

    pub fn error(&self) -> f64 {
        self.error
    }

    pub fn gates(&self) -> GateActivations {
        self.gates
    }

    pub fn cell_gradient(&self) -> f64 {
        self.dl_dc
    }
}
