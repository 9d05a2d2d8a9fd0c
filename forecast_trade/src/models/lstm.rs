//! Single-layer LSTM with a linear read-out, trained by backpropagation
//! through time and Adam
//!
//! The network is univariate: each time step feeds one scaled price. Gate
//! weights are stacked in the order input, forget, candidate, output, so the
//! pre-activation vector has `4 * hidden` entries.

use ndarray::{s, Array1, Array2, ArrayBase, Axis, DataMut, Dimension, Zip};
use rand::Rng;
use rand_distr::Uniform;

/// Trainable parameters, also used as the shape of gradients and Adam moments
#[derive(Debug, Clone)]
pub struct LstmParams {
    /// Input weights per gate row `[4H]`
    w_x: Array1<f64>,
    /// Recurrent weights `[4H, H]`
    w_h: Array2<f64>,
    /// Gate biases `[4H]`
    bias: Array1<f64>,
    /// Read-out weights `[H]`
    w_out: Array1<f64>,
    b_out: f64,
}

impl LstmParams {
    fn zeros(hidden: usize) -> Self {
        Self {
            w_x: Array1::zeros(4 * hidden),
            w_h: Array2::zeros((4 * hidden, hidden)),
            bias: Array1::zeros(4 * hidden),
            w_out: Array1::zeros(hidden),
            b_out: 0.0,
        }
    }

    fn squared_norm(&self) -> f64 {
        self.w_x.iter().map(|v| v * v).sum::<f64>()
            + self.w_h.iter().map(|v| v * v).sum::<f64>()
            + self.bias.iter().map(|v| v * v).sum::<f64>()
            + self.w_out.iter().map(|v| v * v).sum::<f64>()
            + self.b_out * self.b_out
    }

    fn scale(&mut self, factor: f64) {
        self.w_x *= factor;
        self.w_h *= factor;
        self.bias *= factor;
        self.w_out *= factor;
        self.b_out *= factor;
    }

    fn is_finite(&self) -> bool {
        self.squared_norm().is_finite()
    }
}

/// Activations kept from the forward pass of one time step
struct StepCache {
    x: f64,
    h_prev: Array1<f64>,
    c_prev: Array1<f64>,
    input: Array1<f64>,
    forget: Array1<f64>,
    candidate: Array1<f64>,
    output: Array1<f64>,
    tanh_c: Array1<f64>,
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// LSTM network mapping a scaled price window to the next scaled price
#[derive(Debug, Clone)]
pub struct LstmNetwork {
    hidden: usize,
    params: LstmParams,
}

impl LstmNetwork {
    /// Uniform initialisation in `±1/sqrt(H)`, forget bias 1
    pub fn new<R: Rng + ?Sized>(hidden: usize, rng: &mut R) -> Self {
        let limit = (1.0 / hidden.max(1) as f64).sqrt();
        let dist = Uniform::new_inclusive(-limit, limit);

        let mut bias = Array1::zeros(4 * hidden);
        bias.slice_mut(s![hidden..2 * hidden]).fill(1.0);

        let params = LstmParams {
            w_x: Array1::from_shape_fn(4 * hidden, |_| rng.sample(dist)),
            w_h: Array2::from_shape_fn((4 * hidden, hidden), |_| rng.sample(dist)),
            bias,
            w_out: Array1::from_shape_fn(hidden, |_| rng.sample(dist)),
            b_out: 0.0,
        };

        Self { hidden, params }
    }

    pub fn hidden_size(&self) -> usize {
        self.hidden
    }

    pub fn params(&self) -> &LstmParams {
        &self.params
    }

    pub fn set_params(&mut self, params: LstmParams) {
        self.params = params;
    }

    pub fn predict(&self, sequence: &[f64]) -> f64 {
        self.forward(sequence).0
    }

    fn forward(&self, sequence: &[f64]) -> (f64, Vec<StepCache>, Array1<f64>) {
        let hid = self.hidden;
        let mut h = Array1::zeros(hid);
        let mut c = Array1::zeros(hid);
        let mut cache = Vec::with_capacity(sequence.len());

        for &x in sequence {
            let pre = &self.params.w_x * x + self.params.w_h.dot(&h) + &self.params.bias;

            let input = pre.slice(s![0..hid]).mapv(sigmoid);
            let forget = pre.slice(s![hid..2 * hid]).mapv(sigmoid);
            let candidate = pre.slice(s![2 * hid..3 * hid]).mapv(f64::tanh);
            let output = pre.slice(s![3 * hid..4 * hid]).mapv(sigmoid);

            let c_next = &forget * &c + &input * &candidate;
            let tanh_c = c_next.mapv(f64::tanh);
            let h_next = &output * &tanh_c;

            cache.push(StepCache {
                x,
                h_prev: std::mem::replace(&mut h, h_next),
                c_prev: std::mem::replace(&mut c, c_next),
                input,
                forget,
                candidate,
                output,
                tanh_c,
            });
        }

        let prediction = self.params.w_out.dot(&h) + self.params.b_out;
        (prediction, cache, h)
    }

    /// Accumulate the gradient of `d_out * prediction` into `grads`
    fn backward(&self, cache: &[StepCache], last_hidden: &Array1<f64>, d_out: f64, grads: &mut LstmParams) {
        let hid = self.hidden;

        grads.w_out.scaled_add(d_out, last_hidden);
        grads.b_out += d_out;

        let mut dh = &self.params.w_out * d_out;
        let mut dc: Array1<f64> = Array1::zeros(hid);
        let mut d_pre: Array1<f64> = Array1::zeros(4 * hid);

        for step in cache.iter().rev() {
            let d_output = &dh * &step.tanh_c;
            dc = dc + &dh * &step.output * &step.tanh_c.mapv(|t| 1.0 - t * t);

            let d_input = &dc * &step.candidate;
            let d_candidate = &dc * &step.input;
            let d_forget = &dc * &step.c_prev;

            d_pre
                .slice_mut(s![0..hid])
                .assign(&(d_input * &step.input.mapv(|v| v * (1.0 - v))));
            d_pre
                .slice_mut(s![hid..2 * hid])
                .assign(&(d_forget * &step.forget.mapv(|v| v * (1.0 - v))));
            d_pre
                .slice_mut(s![2 * hid..3 * hid])
                .assign(&(d_candidate * &step.candidate.mapv(|v| 1.0 - v * v)));
            d_pre
                .slice_mut(s![3 * hid..4 * hid])
                .assign(&(d_output * &step.output.mapv(|v| v * (1.0 - v))));

            grads.w_x.scaled_add(step.x, &d_pre);
            let outer = d_pre
                .view()
                .insert_axis(Axis(1))
                .dot(&step.h_prev.view().insert_axis(Axis(0)));
            grads.w_h += &outer;
            grads.bias += &d_pre;

            dh = self.params.w_h.t().dot(&d_pre);
            dc = &dc * &step.forget;
        }
    }

    /// One optimisation step on a mini-batch of `(window, target)` pairs.
    /// Returns the batch mean squared error before the update.
    pub fn train_batch(&mut self, batch: &[(&[f64], f64)], optimizer: &mut Adam) -> f64 {
        if batch.is_empty() {
            return 0.0;
        }

        let mut grads = LstmParams::zeros(self.hidden);
        let mut loss = 0.0;
        let n = batch.len() as f64;

        for (window, target) in batch {
            let (prediction, cache, last_hidden) = self.forward(window);
            let residual = prediction - target;
            loss += residual * residual;
            self.backward(&cache, &last_hidden, 2.0 * residual / n, &mut grads);
        }

        let norm = grads.squared_norm().sqrt();
        if norm > optimizer.clip_norm {
            grads.scale(optimizer.clip_norm / norm);
        }
        if grads.is_finite() {
            optimizer.step(&mut self.params, &grads);
        }

        loss / n
    }

    /// Mean squared error over `(window, target)` pairs without updating
    pub fn mean_squared_error(&self, samples: &[(&[f64], f64)]) -> f64 {
        if samples.is_empty() {
            return 0.0;
        }
        samples
            .iter()
            .map(|(window, target)| {
                let residual = self.predict(window) - target;
                residual * residual
            })
            .sum::<f64>()
            / samples.len() as f64
    }
}

/// Adam optimiser state for one [`LstmNetwork`]
#[derive(Debug, Clone)]
pub struct Adam {
    learning_rate: f64,
    beta1: f64,
    beta2: f64,
    epsilon: f64,
    clip_norm: f64,
    steps: i32,
    m: LstmParams,
    v: LstmParams,
}

impl Adam {
    pub fn new(hidden: usize, learning_rate: f64, clip_norm: f64) -> Self {
        Self {
            learning_rate,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-8,
            clip_norm,
            steps: 0,
            m: LstmParams::zeros(hidden),
            v: LstmParams::zeros(hidden),
        }
    }

    fn step(&mut self, params: &mut LstmParams, grads: &LstmParams) {
        self.steps = self.steps.saturating_add(1);
        let rule = AdamRule {
            lr: self.learning_rate,
            beta1: self.beta1,
            beta2: self.beta2,
            epsilon: self.epsilon,
            correction1: 1.0 - self.beta1.powi(self.steps),
            correction2: 1.0 - self.beta2.powi(self.steps),
        };

        rule.apply(&mut params.w_x, &mut self.m.w_x, &mut self.v.w_x, &grads.w_x);
        rule.apply(&mut params.w_h, &mut self.m.w_h, &mut self.v.w_h, &grads.w_h);
        rule.apply(&mut params.bias, &mut self.m.bias, &mut self.v.bias, &grads.bias);
        rule.apply(&mut params.w_out, &mut self.m.w_out, &mut self.v.w_out, &grads.w_out);
        params.b_out -= rule.delta(&mut self.m.b_out, &mut self.v.b_out, grads.b_out);
    }
}

struct AdamRule {
    lr: f64,
    beta1: f64,
    beta2: f64,
    epsilon: f64,
    correction1: f64,
    correction2: f64,
}

impl AdamRule {
    fn delta(&self, m: &mut f64, v: &mut f64, g: f64) -> f64 {
        *m = self.beta1 * *m + (1.0 - self.beta1) * g;
        *v = self.beta2 * *v + (1.0 - self.beta2) * g * g;
        let m_hat = *m / self.correction1;
        let v_hat = *v / self.correction2;
        self.lr * m_hat / (v_hat.sqrt() + self.epsilon)
    }

    fn apply<S, D>(
        &self,
        param: &mut ArrayBase<S, D>,
        m: &mut ArrayBase<S, D>,
        v: &mut ArrayBase<S, D>,
        grad: &ArrayBase<S, D>,
    ) where
        S: DataMut<Elem = f64>,
        D: Dimension,
    {
        Zip::from(param)
            .and(m)
            .and(v)
            .and(grad)
            .for_each(|p, m, v, &g| *p -= self.delta(m, v, g));
    }
}
