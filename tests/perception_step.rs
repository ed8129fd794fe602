//! End-to-end pipeline tests on synthetic camera frames

use terramap::config::{PerceptionConfig, Point};
use terramap::map::MapChannel;
use terramap::{Frame, Perception, RoverState};

const WIDTH: usize = 320;
const HEIGHT: usize = 160;

/// A config whose rectification source equals the destination square, so
/// the warp is the identity and mask contents follow directly from the
/// input frame.
fn identity_config() -> PerceptionConfig {
    let mut config = PerceptionConfig::default();
    let dst = config.rectification.destination_corners(WIDTH, HEIGHT);
    config.rectification.source = dst.map(|(x, y)| Point::new(x, y));
    config
}

fn solid_frame(rgb: [u8; 3]) -> Frame {
    let mut frame = Frame::new(WIDTH, HEIGHT);
    for y in 0..HEIGHT {
        for x in 0..WIDTH {
            frame.set_pixel(x, y, rgb);
        }
    }
    frame
}

fn channel_sum(rover: &RoverState, channel: MapChannel) -> f64 {
    let size = rover.worldmap.size();
    let mut sum = 0.0;
    for y in 0..size {
        for x in 0..size {
            sum += rover.worldmap.get(x, y, channel) as f64;
        }
    }
    sum
}

#[test]
fn bright_frame_maps_ground_and_doubles_on_repeat() {
    let perception = Perception::new(identity_config(), WIDTH, HEIGHT).unwrap();
    let mut rover = RoverState::new(WIDTH, HEIGHT, 200);
    rover.img = solid_frame([220, 210, 200]);
    rover.pos = (100.0, 100.0);

    perception.perception_step(&mut rover).unwrap();

    // Every pixel classified ground, none obstacle.
    let ground_total = channel_sum(&rover, MapChannel::Ground);
    assert_eq!(ground_total, (WIDTH * HEIGHT) as f64);
    assert_eq!(channel_sum(&rover, MapChannel::Obstacle), 0.0);

    // Debug image: blue channel saturated, red clear.
    assert_eq!(rover.vision_image.pixel(10, 10), [0, 0, 255]);

    // Accumulation is additive: a second identical frame doubles every
    // affected cell.
    let after_one: Vec<f32> = rover.worldmap.data().to_vec();
    perception.perception_step(&mut rover).unwrap();
    for (a, b) in after_one.iter().zip(rover.worldmap.data().iter()) {
        assert_eq!(*b, a * 2.0);
    }
}

#[test]
fn black_frame_maps_obstacle_everywhere() {
    let perception = Perception::new(identity_config(), WIDTH, HEIGHT).unwrap();
    let mut rover = RoverState::new(WIDTH, HEIGHT, 200);
    rover.img = solid_frame([0, 0, 0]);
    rover.pos = (100.0, 100.0);

    perception.perception_step(&mut rover).unwrap();

    assert_eq!(
        channel_sum(&rover, MapChannel::Obstacle),
        (WIDTH * HEIGHT) as f64
    );
    assert_eq!(channel_sum(&rover, MapChannel::Ground), 0.0);
    assert_eq!(rover.vision_image.pixel(5, 5), [255, 0, 0]);
}

#[test]
fn tilted_rover_skips_map_update_but_still_sees() {
    let perception = Perception::new(identity_config(), WIDTH, HEIGHT).unwrap();
    let mut rover = RoverState::new(WIDTH, HEIGHT, 200);
    rover.img = solid_frame([220, 210, 200]);
    rover.pos = (100.0, 100.0);
    rover.pitch = 5.0;

    perception.perception_step(&mut rover).unwrap();

    // The map stays byte-for-byte empty while tilted.
    assert!(rover.worldmap.data().iter().all(|&v| v == 0.0));
    // Vision image and nav fields are still refreshed.
    assert_eq!(rover.vision_image.pixel(0, 0), [0, 0, 255]);

    // Once level again, the same frame lands in the map.
    rover.pitch = 0.0;
    perception.perception_step(&mut rover).unwrap();
    assert!(channel_sum(&rover, MapChannel::Ground) > 0.0);
}

#[test]
fn nav_readings_are_overwritten_each_step() {
    // An inverted polar band keeps everything, making the nav output
    // observable.
    let mut config = identity_config();
    config.polar.min_distance = f64::INFINITY;
    config.polar.max_distance = 0.0;
    let perception = Perception::new(config, WIDTH, HEIGHT).unwrap();

    let mut rover = RoverState::new(WIDTH, HEIGHT, 200);
    rover.img = solid_frame([220, 210, 200]);
    rover.pos = (100.0, 100.0);

    perception.perception_step(&mut rover).unwrap();
    assert_eq!(rover.nav.len(), WIDTH * HEIGHT);
    assert_eq!(rover.nav.distances.len(), rover.nav.angles.len());

    // A black frame has no navigable ground; the previous reading must not
    // linger.
    rover.img = solid_frame([0, 0, 0]);
    perception.perception_step(&mut rover).unwrap();
    assert!(rover.nav.is_empty());
}

#[test]
fn stock_polar_band_yields_empty_nav() {
    // The stock band (min 30 < max 60) drops every reading; pinned here so
    // any retuning of the band is a deliberate change.
    let perception = Perception::new(identity_config(), WIDTH, HEIGHT).unwrap();
    let mut rover = RoverState::new(WIDTH, HEIGHT, 200);
    rover.img = solid_frame([220, 210, 200]);
    rover.pos = (100.0, 100.0);

    perception.perception_step(&mut rover).unwrap();
    assert!(rover.nav.is_empty());
}
