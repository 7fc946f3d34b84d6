//! End-to-end poller tests against a scripted in-process agent.

mod common;

use std::time::Duration;

use common::{AgentBehavior, Recorder, StubAgent, counter_data, numbered_oids};
use snmp_bulkpoll::{Error, PollConfig, UdpPoller, Value, Version};

fn config_for(agent: &StubAgent, oids: Vec<snmp_bulkpoll::Oid>) -> snmp_bulkpoll::PollConfigBuilder {
    PollConfig::builder(agent.addr().to_string())
        .version(Version::V2c)
        .community(&b"public"[..])
        .timeout(Duration::from_millis(500))
        .retries(1)
        .oids(oids)
}

/// A full cycle at split 2 delivers every configured OID, in order.
#[tokio::test]
async fn full_cycle_delivers_all_samples() {
    let oids = numbered_oids(5);
    let agent = StubAgent::spawn(counter_data(&oids), AgentBehavior::Normal).await;

    let config = config_for(&agent, oids.clone()).split(2).build().unwrap();
    let mut driver = UdpPoller::connect(config, Recorder::default()).await.unwrap();

    driver.poll_once().await.unwrap();

    assert_eq!(driver.poller().split_size(), 2);
    assert_eq!(driver.poller().chunk_count(), 3);

    let recorder = driver.into_handler();
    assert_eq!(recorder.samples.len(), 5);
    for (i, (oid, value, _at)) in recorder.samples.iter().enumerate() {
        assert_eq!(oid, &oids[i]);
        assert_eq!(value, &Value::Counter64(i as u64));
    }
}

/// An agent that rejects requests over 2 varbinds forces one halving
/// (5 -> 2); the cycle restarts and still delivers everything.
#[tokio::test]
async fn too_big_shrinks_split_and_delivers() {
    let oids = numbered_oids(5);
    let agent = StubAgent::spawn(counter_data(&oids), AgentBehavior::VarbindCap(2)).await;

    // Default split: all 5 OIDs in one request
    let config = config_for(&agent, oids.clone()).build().unwrap();
    let mut driver = UdpPoller::connect(config, Recorder::default()).await.unwrap();

    driver.poll_once().await.unwrap();

    assert_eq!(driver.poller().split_size(), 2);
    assert_eq!(driver.poller().chunk_count(), 3);

    let recorder = driver.into_handler();
    let delivered: Vec<_> = recorder.samples.iter().map(|(oid, ..)| oid.clone()).collect();
    assert_eq!(delivered, oids);
}

/// Repeated tooBig answers walk the split all the way down to single-OID
/// requests.
#[tokio::test]
async fn repeated_too_big_reaches_single_oid_requests() {
    let oids = numbered_oids(4);
    let agent = StubAgent::spawn(counter_data(&oids), AgentBehavior::VarbindCap(1)).await;

    let config = config_for(&agent, oids.clone()).build().unwrap();
    let mut driver = UdpPoller::connect(config, Recorder::default()).await.unwrap();

    driver.poll_once().await.unwrap();

    assert_eq!(driver.poller().split_size(), 1);
    assert_eq!(driver.poller().chunk_count(), 4);
    assert_eq!(driver.into_handler().samples.len(), 4);
}

/// A silent agent exhausts the retries and surfaces a timeout.
#[tokio::test]
async fn mute_agent_times_out() {
    let oids = numbered_oids(2);
    let agent = StubAgent::spawn(counter_data(&oids), AgentBehavior::Mute).await;

    let config = config_for(&agent, oids)
        .timeout(Duration::from_millis(50))
        .build()
        .unwrap();
    let mut driver = UdpPoller::connect(config, Recorder::default()).await.unwrap();

    let err = driver.poll_once().await.unwrap_err();
    assert!(matches!(*err, Error::Timeout { retries: 1, .. }), "got {err}");
    assert!(driver.into_handler().samples.is_empty());
}

/// `run()` executes the first cycle immediately and returns the handler on
/// cancellation.
#[tokio::test]
async fn run_polls_and_stops_on_cancel() {
    let oids = numbered_oids(3);
    let agent = StubAgent::spawn(counter_data(&oids), AgentBehavior::Normal).await;

    let config = config_for(&agent, oids.clone())
        .interval(Duration::from_secs(3600))
        .build()
        .unwrap();
    let driver = UdpPoller::connect(config, Recorder::default()).await.unwrap();
    let cancel = driver.cancellation_token();

    let task = tokio::spawn(driver.run());
    tokio::time::sleep(Duration::from_millis(300)).await;
    cancel.cancel();

    let recorder = task.await.unwrap();
    assert_eq!(recorder.samples.len(), 3);
}

/// Values the agent does not carry come back as exceptions, which are
/// forwarded to the handler unmodified.
#[tokio::test]
async fn missing_oids_forward_exception_values() {
    let oids = numbered_oids(3);
    // Agent only knows the first two
    let agent = StubAgent::spawn(counter_data(&oids[..2]), AgentBehavior::Normal).await;

    let config = config_for(&agent, oids.clone()).build().unwrap();
    let mut driver = UdpPoller::connect(config, Recorder::default()).await.unwrap();

    driver.poll_once().await.unwrap();

    let recorder = driver.into_handler();
    assert_eq!(recorder.samples.len(), 3);
    assert_eq!(recorder.samples[2].1, Value::NoSuchInstance);
}
