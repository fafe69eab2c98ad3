//! # Follow Cycle Benchmark

use criterion::{criterion_group, criterion_main, Criterion};

use comms_if::bus::{Announce, EstimatedState, FollowSystem, SpeedUnits, ZUnits};
use follow_lib::{
    follow_mgr::{FollowMgr, FollowParams},
    geo::{GeoPoint, Geodesy, Wgs84},
};

fn follow_cycle_benchmark(c: &mut Criterion) {
    // ---- Build an active maneuver ----

    let geo = Wgs84;
    let leader = GeoPoint::from_deg(41.1861304, -8.70793785);

    let mut params = FollowParams::with_own_id(2);
    params.peer_ids = vec![3];

    let mut mgr = FollowMgr::new(params).unwrap();
    mgr.activate(
        FollowSystem {
            system: 1,
            duration_s: 0,
            speed: 1.5,
            speed_units: SpeedUnits::MetersPs,
            x_m: -20.0,
            y_m: 10.0,
            z_m: 0.0,
            z_units: ZUnits::Depth,
            loiter_radius_m: None,
        },
        0.0,
    )
    .unwrap();

    // Own vehicle and both peers, far enough apart to pass every check
    let own = geo.displace(&leader, -60.0, 10.0);
    mgr.on_estimated_state(&EstimatedState {
        source: 2,
        lat_rad: own.lat_rad,
        lon_rad: own.lon_rad,
        x_m: 0.0,
        y_m: 0.0,
        z_m: 0.0,
    });

    for (source, n, e) in [(3, -60.0, -30.0), (4, -120.0, 0.0)].iter() {
        let p = geo.displace(&leader, *n, *e);
        mgr.on_announce(
            &Announce {
                source: *source,
                lat_rad: p.lat_rad,
                lon_rad: p.lon_rad,
                height_m: 0.0,
                timestamp_s: 0.0,
            },
            0.0,
        );
    }

    // Leader moving north at 1 m/s
    let mut t = 0.0;

    c.bench_function("FollowMgr::on_announce", |b| {
        b.iter(|| {
            t += 1.0;
            let p = geo.displace(&leader, t, 0.0);
            mgr.on_announce(
                &Announce {
                    source: 1,
                    lat_rad: p.lat_rad,
                    lon_rad: p.lon_rad,
                    height_m: 0.0,
                    timestamp_s: t,
                },
                t,
            )
        })
    });

    c.bench_function("FollowMgr::on_state_report", |b| {
        b.iter(|| mgr.on_state_report(t))
    });
}

criterion_group!(benches, follow_cycle_benchmark);
criterion_main!(benches);
