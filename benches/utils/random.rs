#![allow(dead_code)]

use geo::{Coord, LineString, Rect};

use rand::{thread_rng, Rng};
use rand_distr::{Distribution, Exp, Standard};

#[inline]
pub fn uniform_point<R: Rng>(rng: &mut R, bounds: Rect<f64>) -> Coord<f64> {
    let coords: [f64; 2] = rng.sample(Standard);
    let dims = bounds.max() - bounds.min();
    Coord {
        x: bounds.min().x + dims.x * coords[0],
        y: bounds.min().y + dims.y * coords[1],
    }
}

#[inline]
pub fn uniform_segment<R: Rng>(rng: &mut R, bounds: Rect<f64>) -> LineString<f64> {
    LineString::new(vec![uniform_point(rng, bounds), uniform_point(rng, bounds)])
}

/// Rectangles with a uniform random corner in `[0, extent]²` and
/// exponentially distributed sides of mean `mean_size`.
pub fn random_rects(n: usize, extent: f64, mean_size: f64) -> impl Iterator<Item = Rect<f64>> {
    let mut rng = thread_rng();
    let bounds = Rect::new([0., 0.], [extent, extent]);
    let size = Exp::new(1. / mean_size).expect("mean size must be positive");
    (0..n).map(move |_| {
        let min = uniform_point(&mut rng, bounds);
        let dims = Coord {
            x: size.sample(&mut rng),
            y: size.sample(&mut rng),
        };
        Rect::new(min, min + dims)
    })
}

/// Two point lines with uniform random end-points in `[0, extent]²`.
pub fn random_lines(n: usize, extent: f64) -> impl Iterator<Item = LineString<f64>> {
    let mut rng = thread_rng();
    let bounds = Rect::new([0., 0.], [extent, extent]);
    (0..n).map(move |_| uniform_segment(&mut rng, bounds))
}
