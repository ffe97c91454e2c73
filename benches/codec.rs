use criterion::{black_box, criterion_group, criterion_main, Criterion};

use abiwire::{bin_to_json, json_to_bin, Contract, RawAbi};

const TOKEN_ABI: &str = r#"{
    "version": "eosio::abi/1.1",
    "structs": [{
        "name": "transfer",
        "base": "",
        "fields": [
            {"name": "from", "type": "name"},
            {"name": "to", "type": "name"},
            {"name": "quantity", "type": "asset"},
            {"name": "memo", "type": "string"}
        ]
    }],
    "actions": [{"name": "transfer", "type": "transfer", "ricardian_contract": ""}]
}"#;

const TRANSFER_JSON: &str =
    r#"{"from":"useraaaaaaaa","to":"useraaaaaaab","quantity":"0.0001 SYS","memo":"benchmark"}"#;

fn contract() -> Contract {
    Contract::from_abi(&RawAbi::from_json(TOKEN_ABI.as_bytes()).unwrap()).unwrap()
}

fn load_bench(c: &mut Criterion) {
    c.bench_function("abi_load", |b| {
        b.iter(|| black_box(contract()))
    });
}

fn encode_bench(c: &mut Criterion) {
    let contract = contract();
    c.bench_function("json_to_bin_transfer", |b| {
        b.iter(|| black_box(json_to_bin(&contract, "transfer", TRANSFER_JSON).unwrap()))
    });
}

fn decode_bench(c: &mut Criterion) {
    let contract = contract();
    let bin = json_to_bin(&contract, "transfer", TRANSFER_JSON).unwrap();
    c.bench_function("bin_to_json_transfer", |b| {
        b.iter(|| black_box(bin_to_json(&contract, "transfer", &bin).unwrap()))
    });
}

criterion_group! {
    name = codec_benches;
    config = Criterion::default();
    targets = load_bench, encode_bench, decode_bench
}

criterion_main!(codec_benches);
