use core::time::Duration;
use std::{
    collections::HashSet,
    sync::{
        Arc, Barrier, Mutex,
        atomic::{AtomicBool, AtomicU64, Ordering},
    },
    thread::scope,
    time::Instant,
};

use crate::{
    Clock, Config, DEFAULT_EPOCH, DecimalId, Error, Generator, IdGenStatus, MonotonicClock,
    PackedId, SystemClock, TrilliumId, WorkerIdSource,
};

/// A clock that only moves when told to.
#[derive(Clone, Default)]
struct MockClock {
    nanos: Arc<AtomicU64>,
}

impl MockClock {
    fn at(now: Duration) -> Self {
        let clock = Self::default();
        clock.set(now);
        clock
    }

    fn set(&self, now: Duration) {
        #[allow(clippy::cast_possible_truncation)]
        self.nanos.store(now.as_nanos() as u64, Ordering::Relaxed);
    }
}

impl Clock for MockClock {
    fn now(&self) -> Duration {
        Duration::from_nanos(self.nanos.load(Ordering::Relaxed))
    }
}

trait IdGenStatusExt<T>
where
    T: TrilliumId,
{
    fn unwrap_ready(self) -> T;
    fn unwrap_pending(self) -> Duration;
}

impl<T> IdGenStatusExt<T> for IdGenStatus<T>
where
    T: TrilliumId,
{
    fn unwrap_ready(self) -> T {
        match self {
            Self::Ready { id } => id,
            Self::Pending { yield_for } => {
                panic!("unexpected pending (yield for: {yield_for:?})")
            }
        }
    }

    fn unwrap_pending(self) -> Duration {
        match self {
            Self::Ready { id } => panic!("unexpected ready ({id})"),
            Self::Pending { yield_for } => yield_for,
        }
    }
}

fn exhaust_tick<ID, C>(generator: &Generator<ID, C>, tick: u64)
where
    ID: TrilliumId,
    C: Clock,
{
    for i in 0..=ID::max_sequence() {
        let id = generator.try_poll().unwrap().unwrap_ready();
        assert_eq!(id.timestamp(), tick);
        assert_eq!(id.sequence(), i);
    }
}

#[test]
fn sequence_increments_within_same_tick() {
    let clock = MockClock::at(Duration::from_millis(420));
    let generator = Generator::<PackedId, _>::new(Duration::ZERO, 1, clock).unwrap();

    let id1 = generator.try_poll().unwrap().unwrap_ready();
    let id2 = generator.try_poll().unwrap().unwrap_ready();
    let id3 = generator.try_poll().unwrap().unwrap_ready();

    assert_eq!(id1.timestamp(), 42);
    assert_eq!(id2.timestamp(), 42);
    assert_eq!(id3.timestamp(), 42);
    assert_eq!(id1.sequence(), 0);
    assert_eq!(id2.sequence(), 1);
    assert_eq!(id3.sequence(), 2);
    assert!(id1 < id2 && id2 < id3);
}

#[test]
fn first_id_of_each_tick_starts_at_zero() {
    let clock = MockClock::at(Duration::from_secs(7));
    let generator = Generator::<DecimalId, _>::new(Duration::ZERO, 3, clock.clone()).unwrap();

    let first = generator.generate().unwrap();
    assert_eq!((first.timestamp(), first.sequence()), (7, 0));

    clock.set(Duration::from_secs(9));
    let next = generator.generate().unwrap();
    assert_eq!((next.timestamp(), next.sequence()), (9, 0));
}

#[test]
fn pending_reports_time_to_next_tick() {
    let clock = MockClock::at(Duration::from_millis(425));
    let generator = Generator::<PackedId, _>::new(Duration::ZERO, 1, clock).unwrap();

    exhaust_tick(&generator, 42);

    let yield_for = generator.try_poll().unwrap().unwrap_pending();
    assert_eq!(yield_for, Duration::from_millis(5));

    // Pending does not consume a sequence value.
    let yield_for = generator.try_poll().unwrap().unwrap_pending();
    assert_eq!(yield_for, Duration::from_millis(5));
}

#[test]
fn generator_handles_rollover() {
    let clock = MockClock::at(Duration::from_millis(420));
    let generator = Generator::<PackedId, _>::new(Duration::ZERO, 1, clock.clone()).unwrap();

    exhaust_tick(&generator, 42);
    let yield_for = generator.try_poll().unwrap().unwrap_pending();
    assert_eq!(yield_for, PackedId::TICK);

    clock.set(Duration::from_millis(430));

    let id = generator.try_poll().unwrap().unwrap_ready();
    assert_eq!(id.timestamp(), 43);
    assert_eq!(id.sequence(), 0);
    assert_eq!(id.worker_id(), 1);
}

#[test]
fn decimal_quota_is_one_hundred_thousand_per_second() {
    let clock = MockClock::at(Duration::from_millis(5_250));
    let generator = Generator::<DecimalId, _>::new(Duration::ZERO, 42, clock).unwrap();

    exhaust_tick(&generator, 5);

    let yield_for = generator.try_poll().unwrap().unwrap_pending();
    assert_eq!(yield_for, Duration::from_millis(750));
}

#[test]
fn clock_moving_backward_continues_on_last_tick() {
    let clock = MockClock::at(Duration::from_millis(100));
    let generator = Generator::<PackedId, _>::new(Duration::ZERO, 1, clock.clone()).unwrap();

    let first = generator.try_poll().unwrap().unwrap_ready();
    assert_eq!(first.timestamp(), 10);

    clock.set(Duration::from_millis(80));
    let second = generator.try_poll().unwrap().unwrap_ready();
    assert_eq!(second.timestamp(), 10);
    assert_eq!(second.sequence(), 1);
    assert!(second > first);

    // Exhausting the last tick while behind waits until the clock passes it.
    for _ in 2..=PackedId::max_sequence() {
        generator.try_poll().unwrap().unwrap_ready();
    }
    let yield_for = generator.try_poll().unwrap().unwrap_pending();
    assert_eq!(yield_for, Duration::from_millis(30));
}

#[test]
fn ids_are_monotonic_with_real_clock() {
    const TOTAL_IDS: usize = 256 * 64;

    let generator =
        Generator::<PackedId, _>::new(DEFAULT_EPOCH, 1, MonotonicClock::default()).unwrap();

    let mut last = generator.generate().unwrap();
    for _ in 1..TOTAL_IDS {
        let id = generator.generate().unwrap();
        assert!(id > last);
        assert_eq!(id.worker_id(), 1);
        if id.timestamp() == last.timestamp() {
            assert_eq!(id.sequence(), last.sequence() + 1);
        } else {
            assert_eq!(id.sequence(), 0);
        }
        last = id;
    }
}

#[test]
fn ids_are_unique_across_threads() {
    const THREADS: usize = 8;
    const TOTAL_IDS: usize = 256 * 64;
    const IDS_PER_THREAD: usize = TOTAL_IDS / THREADS;

    let generator = Generator::<PackedId, _>::new(DEFAULT_EPOCH, 1, SystemClock).unwrap();
    let seen_ids = Mutex::new(HashSet::with_capacity(TOTAL_IDS));

    scope(|s| {
        for _ in 0..THREADS {
            let generator = generator.clone();
            let seen_ids = &seen_ids;

            s.spawn(move || {
                for _ in 0..IDS_PER_THREAD {
                    let id = generator.generate().unwrap();
                    assert!(seen_ids.lock().unwrap().insert(id));
                }
            });
        }
    });

    assert_eq!(seen_ids.lock().unwrap().len(), TOTAL_IDS);
}

#[test]
fn ids_are_unique_across_workers_on_the_same_tick() {
    let clock = MockClock::at(Duration::from_secs(1));
    let a = Generator::<DecimalId, _>::new(Duration::ZERO, 1, clock.clone()).unwrap();
    let b = Generator::<DecimalId, _>::new(Duration::ZERO, 2, clock).unwrap();

    let mut seen = HashSet::new();
    for _ in 0..1_000 {
        assert!(seen.insert(a.generate().unwrap().to_string()));
        assert!(seen.insert(b.generate().unwrap().to_string()));
    }
}

#[test]
fn clones_share_state() {
    let clock = MockClock::at(Duration::from_millis(10));
    let generator = Generator::<PackedId, _>::new(Duration::ZERO, 5, clock).unwrap();
    let clone = generator.clone();

    let a = generator.try_poll().unwrap().unwrap_ready();
    let b = clone.try_poll().unwrap().unwrap_ready();
    assert_eq!(a.sequence(), 0);
    assert_eq!(b.sequence(), 1);
    assert_eq!(clone.worker_id(), 5);
}

#[test]
fn rejects_worker_id_outside_layout() {
    let clock = MockClock::default();

    assert_eq!(
        Generator::<DecimalId, _>::new(Duration::ZERO, 100_000, clock.clone()).unwrap_err(),
        Error::InvalidWorkerId {
            worker_id: 100_000,
            max: 99_999,
        }
    );
    assert_eq!(
        Generator::<PackedId, _>::new(Duration::ZERO, u64::MAX, clock.clone()).unwrap_err(),
        Error::InvalidWorkerId {
            worker_id: u64::MAX,
            max: 65_535,
        }
    );
    assert!(Generator::<PackedId, _>::new(Duration::ZERO, 65_535, clock).is_ok());
}

#[test]
fn clock_before_epoch_is_an_error() {
    let clock = MockClock::at(Duration::from_secs(4));
    let generator = Generator::<PackedId, _>::new(Duration::from_secs(10), 0, clock).unwrap();

    assert_eq!(
        generator.try_poll().unwrap_err(),
        Error::ClockBeforeEpoch {
            behind: Duration::from_secs(6),
        }
    );
}

#[test]
fn over_time_limit_when_timestamp_overflows() {
    let max = PackedId::max_timestamp();
    assert_eq!(max, (1 << 39) - 1);

    let clock = MockClock::at(Duration::from_millis(10 << 39));
    let generator = Generator::<PackedId, _>::new(Duration::ZERO, 0, clock).unwrap();

    assert_eq!(
        generator.try_poll().unwrap_err(),
        Error::OverTimeLimit {
            tick: 1 << 39,
            max,
        }
    );
}

#[test]
fn over_time_limit_when_last_tick_is_exhausted() {
    let max = PackedId::max_timestamp();
    let last = PackedId::from_components(max, 3, PackedId::max_sequence());
    let clock = MockClock::at(last.elapsed());
    let generator = Generator::<PackedId, _>::from_components(Duration::ZERO, last, clock).unwrap();

    assert_eq!(
        generator.try_poll().unwrap_err(),
        Error::OverTimeLimit { tick: max + 1, max }
    );
}

#[test]
fn generate_timeout_gives_up_on_exhausted_tick() {
    let clock = MockClock::at(Duration::from_secs(3));
    let last = DecimalId::from_components(3, 1, DecimalId::max_sequence());
    let generator = Generator::<DecimalId, _>::from_components(Duration::ZERO, last, clock).unwrap();

    let started = Instant::now();
    assert_eq!(
        generator.generate_timeout(Duration::from_millis(10)),
        Err(Error::Timeout)
    );
    // The wait is rejected up front instead of sleeping into the deadline.
    assert!(started.elapsed() < Duration::from_millis(500));
}

#[test]
fn generate_timeout_returns_ready_id() {
    let clock = MockClock::at(Duration::from_secs(3));
    let generator = Generator::<DecimalId, _>::new(Duration::ZERO, 1, clock).unwrap();
    let id = generator.generate_timeout(Duration::ZERO).unwrap();
    assert_eq!(id.timestamp(), 3);
}

#[test]
fn generate_until_waits_for_next_tick() {
    let clock = MockClock::at(Duration::from_millis(420));
    let generator = Generator::<PackedId, _>::new(Duration::ZERO, 1, clock.clone()).unwrap();
    exhaust_tick(&generator, 42);

    scope(|s| {
        s.spawn(|| {
            std::thread::sleep(Duration::from_millis(5));
            clock.set(Duration::from_millis(430));
        });
        let id = generator
            .generate_until(Instant::now() + Duration::from_secs(5))
            .unwrap();
        assert_eq!((id.timestamp(), id.sequence()), (43, 0));
    });
}

#[test]
fn resumes_after_persisted_id() {
    let clock = MockClock::at(Duration::from_secs(4));
    let last = DecimalId::from_components(5, 3, 10);
    let generator = Generator::<DecimalId, _>::from_components(Duration::ZERO, last, clock).unwrap();

    assert_eq!(generator.worker_id(), 3);
    let id = generator.generate().unwrap();
    assert_eq!((id.timestamp(), id.sequence()), (5, 11));
    assert!(id > last);
}

#[test]
fn builds_from_config() {
    let config = Config {
        since: 0,
        worker_id: WorkerIdSource::Fixed(42),
    };
    let generator = Generator::<DecimalId, _>::from_config(&config, SystemClock).unwrap();
    assert_eq!(generator.epoch(), DEFAULT_EPOCH);
    assert_eq!(generator.worker_id(), 42);

    let config = Config {
        since: 1_598_918_400,
        worker_id: WorkerIdSource::Random,
    };
    let generator = Generator::<PackedId, _>::from_config(&config, SystemClock).unwrap();
    assert_eq!(generator.epoch(), Duration::from_secs(1_598_918_400));
    assert!(generator.worker_id() <= PackedId::max_worker_id());

    let config = Config {
        since: 0,
        worker_id: WorkerIdSource::Fixed(100_000),
    };
    assert!(Generator::<DecimalId, _>::from_config(&config, SystemClock).is_err());
}

#[test]
fn decimal_ids_from_default_epoch() {
    let generator = Generator::<DecimalId, _>::new(DEFAULT_EPOCH, 42, SystemClock).unwrap();
    let id = generator.generate().unwrap();
    let s = id.to_string();

    assert!(s.len() > 10);
    assert_eq!(&s[s.len() - 10..], "0004200000");

    let expected = (SystemClock.now() - DEFAULT_EPOCH).as_secs();
    assert!(expected.abs_diff(id.timestamp()) <= 1);
    assert!(id.unix_time(DEFAULT_EPOCH).abs_diff(SystemClock.now()) < Duration::from_secs(2));
}

#[test]
fn packed_ids_spill_into_next_tick() {
    let generator =
        Generator::<PackedId, _>::new(DEFAULT_EPOCH, 42, MonotonicClock::default()).unwrap();
    let ids: Vec<_> = (0..=256).map(|_| generator.generate().unwrap()).collect();

    assert!(ids[256].timestamp() > ids[0].timestamp());
    assert!(ids.windows(2).all(|w| w[0] < w[1]));
}

/// A clock that parks its first reader after the reading is taken, until the
/// test releases it.
#[derive(Clone)]
struct GatedClock {
    inner: MockClock,
    armed: Arc<AtomicBool>,
    entered: Arc<Barrier>,
    release: Arc<Barrier>,
}

impl GatedClock {
    fn at(now: Duration) -> Self {
        Self {
            inner: MockClock::at(now),
            armed: Arc::new(AtomicBool::new(true)),
            entered: Arc::new(Barrier::new(2)),
            release: Arc::new(Barrier::new(2)),
        }
    }
}

impl Clock for GatedClock {
    fn now(&self) -> Duration {
        let now = self.inner.now();
        if self.armed.swap(false, Ordering::SeqCst) {
            self.entered.wait();
            self.release.wait();
        }
        now
    }
}

#[test]
fn contended_callers_never_see_a_newer_tick_than_their_reading() {
    let clock = GatedClock::at(Duration::from_millis(429));
    let generator = Generator::<PackedId, _>::new(Duration::ZERO, 1, clock.clone()).unwrap();

    scope(|s| {
        // Reads tick 42, then stalls before deciding.
        let slow = s.spawn(|| generator.try_poll().unwrap());
        clock.entered.wait();

        // The clock moves forward and a second caller races for tick 43.
        clock.inner.set(Duration::from_millis(430));
        let fast = s.spawn(|| {
            let mut ids = Vec::new();
            for _ in 0..=PackedId::max_sequence() {
                ids.push(generator.try_poll().unwrap().unwrap_ready());
            }
            ids
        });
        std::thread::sleep(Duration::from_millis(20));
        clock.release.wait();

        let slow = slow.join().unwrap().unwrap_ready();
        assert_eq!((slow.timestamp(), slow.sequence()), (42, 0));

        let fast = fast.join().unwrap();
        for (i, id) in (0..).zip(&fast) {
            assert_eq!((id.timestamp(), id.sequence()), (43, i));
            assert!(*id > slow);
        }
    });
}

#[test]
fn default_epoch_scenario() {
    let clock = MockClock::at(DEFAULT_EPOCH + Duration::from_millis(1_234_567));
    let generator = Generator::<PackedId, _>::new(DEFAULT_EPOCH, 42, clock.clone()).unwrap();

    let first = generator.generate().unwrap();
    let second = generator.generate().unwrap();
    assert_eq!((first.timestamp(), first.sequence()), (123_456, 0));
    assert_eq!((second.timestamp(), second.sequence()), (123_456, 1));
    assert_eq!(first.worker_id(), 42);

    for _ in 2..=PackedId::max_sequence() {
        generator.generate().unwrap();
    }

    // Call `max_sequence + 2` has to wait for the next tick.
    scope(|s| {
        s.spawn(|| {
            std::thread::sleep(Duration::from_millis(5));
            clock.set(DEFAULT_EPOCH + Duration::from_millis(1_234_570));
        });
        let spilled = generator.generate().unwrap();
        assert!(spilled.timestamp() > first.timestamp());
        assert_eq!((spilled.sequence(), spilled.worker_id()), (0, 42));
    });
}
