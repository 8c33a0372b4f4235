use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use luamin_core::{minify_source, Bundler, MemoryModuleSource, MinifyOptions};

fn generate_module(functions: usize) -> String {
    let mut code = String::from("--# generated\nlocal M = {}\n\n");
    for i in 0..functions {
        code.push_str(&format!(
            r#"function M.compute_{i}(value, factor)
    local scaled = value * factor
    local offset = (scaled + {i}) % 7
    if offset > 3 and not M.disabled then
        return scaled .. ":" .. offset
    end
    for index = 1, #M do
        scaled = scaled - index ^ 2
    end
    return scaled
end

"#
        ));
    }
    code.push_str("return M\n");
    code
}

fn bench_minify_simple(c: &mut Criterion) {
    let source = r#"
        local Account = {}
        Account.__index = Account

        function Account.new(balance)
            return setmetatable({ balance = balance or 0 }, Account)
        end

        function Account:deposit(amount)
            self.balance = self.balance + amount
        end

        return Account
    "#;
    let options = MinifyOptions::default();

    c.bench_function("minify_simple", |b| {
        b.iter(|| minify_source("account", black_box(source), &options))
    });
}

fn bench_minify_size_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("minify_scaling");
    let options = MinifyOptions::default();

    for size in [10, 50, 100, 500].iter() {
        let source = generate_module(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &source, |b, s| {
            b.iter(|| minify_source("generated", black_box(s), &options))
        });
    }
    group.finish();
}

fn bench_bundle_modules(c: &mut Criterion) {
    let mut group = c.benchmark_group("bundle_modules");
    let options = MinifyOptions {
        module_mode: true,
        ..MinifyOptions::default()
    };

    for count in [5, 20, 50].iter() {
        let mut source = MemoryModuleSource::new();
        let mut main = String::new();
        for i in 0..*count {
            main.push_str(&format!("local m{i} = require('lib.m{i}')\n"));
            source.insert(format!("lib.m{i}"), generate_module(10));
        }
        main.push_str("return m0\n");
        source.insert("main", main);

        group.bench_with_input(BenchmarkId::from_parameter(count), &source, |b, s| {
            b.iter(|| Bundler::new(s, &options).bundle("main", None))
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_minify_simple,
    bench_minify_size_scaling,
    bench_bundle_modules
);
criterion_main!(benches);
