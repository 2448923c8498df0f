use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use ldap_client_config::ClientConfig;
use std::hint::black_box;

const CLIENT_CERT: &str = include_str!("../tests/fixtures/client-ec.pem");
const CLIENT_KEY: &str = include_str!("../tests/fixtures/client-ec.key");
const SERVER_CERT: &str = include_str!("../tests/fixtures/server-rsa.pem");

fn base_config() -> ClientConfig {
    ClientConfig {
        urls: vec!["ldaps://ldap.example.com:636".to_string()],
        tls_min_version: "tls12".to_string(),
        tls_max_version: "tls13".to_string(),
        ..Default::default()
    }
}

// Structural rules only, then each PEM field on top
fn validation_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("validate");
    group.throughput(Throughput::Elements(1));

    let plain = base_config();
    group.bench_function("structural", |b| b.iter(|| black_box(&plain).validate()));

    let with_server_cert = ClientConfig {
        certificate: SERVER_CERT.to_string(),
        ..base_config()
    };
    group.bench_function("server_certificate", |b| {
        b.iter(|| black_box(&with_server_cert).validate())
    });

    let with_client_pair = ClientConfig {
        client_tls_cert: CLIENT_CERT.to_string(),
        client_tls_key: CLIENT_KEY.to_string(),
        ..base_config()
    };
    group.bench_function("client_key_pair", |b| {
        b.iter(|| black_box(&with_client_pair).validate())
    });

    group.finish();
}

fn tls_setup_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("tls");
    let validated = ClientConfig {
        certificate: SERVER_CERT.to_string(),
        ..base_config()
    }
    .resolve()
    .unwrap();

    group.bench_function("client_config", |b| {
        b.iter(|| ldap_client_config::tls::client_config(black_box(&validated)))
    });

    group.finish();
}

criterion_group!(benches, validation_benchmark, tls_setup_benchmark);
criterion_main!(benches);
