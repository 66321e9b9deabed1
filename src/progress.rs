use std::io;
use std::io::Write;
use std::time;

use isatty;


pub trait ProgressSink {
	fn start(&mut self, n: Option<usize>);
	fn update(&mut self, inow: usize);
	fn finish(&mut self, inow: Option<usize>);
}


pub struct ProgressMeter {
	t0: time::Instant,
	tprev: time::Instant,
	iprev: usize,
	n: Option<usize>,
}

impl ProgressMeter {
	pub fn new() -> Self {
		let now = time::Instant::now();
		Self{
			t0: now,
			tprev: now,
			iprev: 0,
			n: None,
		}
	}

	fn print(&self, inow: usize, rate: f64, end: &str) {
		match self.n {
			Some(n) if n > 0 => {
				let done = (inow as f64) / (n as f64);
				print!("{:6.0}% [{:8.0}/s]{}", done * 100.0, rate, end);
			},
			_ => {
				print!("{:12} [{:8.0}/s]{}", inow, rate, end);
			},
		}
		// progress output is best effort
		let _ = io::stdout().flush();
	}
}

impl ProgressSink for ProgressMeter {
	fn start(&mut self, n: Option<usize>) {
		let now = time::Instant::now();
		self.t0 = now;
		self.tprev = now;
		self.iprev = 0;
		self.n = n;
		self.print(0, 0.0, "\r");
	}

	fn update(&mut self, inow: usize) {
		let now = time::Instant::now();
		let dt = (now - self.tprev).as_secs_f64();
		let rate = inow.saturating_sub(self.iprev) as f64 / dt;
		self.print(inow, rate, "\r");
		self.iprev = inow;
		self.tprev = now;
	}

	fn finish(&mut self, inow: Option<usize>) {
		let inow = inow.or(self.n).unwrap_or(self.iprev);
		let dt = (time::Instant::now() - self.t0).as_secs_f64();
		let rate = inow as f64 / dt;
		self.print(inow, rate, "\n");
	}
}


pub struct NullSink();

impl ProgressSink for NullSink {
	fn start(&mut self, _n: Option<usize>) {}
	fn update(&mut self, _inow: usize) {}
	fn finish(&mut self, _inow: Option<usize>) {}
}


/// Row counter for loads of unknown length, reporting every `every` rows.
pub struct CountMeter<'s, S: ProgressSink + ?Sized> {
	sink: &'s mut S,
	every: usize,
	n: usize,
}

impl<'s, S: ProgressSink + ?Sized> CountMeter<'s, S> {
	pub fn new(sink: &'s mut S) -> Self {
		Self::with_interval(sink, 10000)
	}

	pub fn with_interval(sink: &'s mut S, every: usize) -> Self {
		sink.start(None);
		Self{
			sink,
			every: every.max(1),
			n: 0,
		}
	}

	pub fn tick(&mut self) {
		self.n += 1;
		if self.n % self.every == 0 {
			self.sink.update(self.n);
		}
	}

	pub fn finish(self) -> usize {
		self.sink.finish(Some(self.n));
		self.n
	}
}


pub fn default_output() -> Box<dyn ProgressSink> {
	if isatty::stdout_isatty() {
		Box::new(ProgressMeter::new())
	} else {
		Box::new(NullSink())
	}
}


#[cfg(test)]
mod tests {
	use super::*;

	#[derive(Default)]
	struct Recorder {
		started: usize,
		updates: Vec<usize>,
		finished: Option<usize>,
	}

	impl ProgressSink for Recorder {
		fn start(&mut self, _n: Option<usize>) {
			self.started += 1;
		}

		fn update(&mut self, inow: usize) {
			self.updates.push(inow);
		}

		fn finish(&mut self, inow: Option<usize>) {
			self.finished = inow;
		}
	}

	#[test]
	fn count_meter_reports_at_interval() {
		let mut rec = Recorder::default();
		{
			let mut pm = CountMeter::with_interval(&mut rec, 3);
			for _ in 0..7 {
				pm.tick();
			}
			assert_eq!(pm.finish(), 7);
		}
		assert_eq!(rec.started, 1);
		assert_eq!(rec.updates, vec![3, 6]);
		assert_eq!(rec.finished, Some(7));
	}
}
