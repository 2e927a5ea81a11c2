use criterion::{Criterion, black_box, criterion_group, criterion_main};
use kickstash::domain::{AddSneakerCommand, Country, Currency, Money, ShoeSize, check_rules};
use sha2::{Digest, Sha256};
use uuid::Uuid;

fn bench_validation(c: &mut Criterion) {
    let command = AddSneakerCommand {
        user_id: Uuid::new_v4(),
        name: "Air Max 90 Essential".to_string(),
        brand: "Nike".to_string(),
        price: Money {
            currency: Currency::USD,
            amount: 129.99,
        },
        size: ShoeSize {
            country: Country::US,
            value: 10,
        },
        rate: 4,
    };

    c.bench_function("validate_add_sneaker_command", |b| {
        b.iter(|| {
            let _ = check_rules(black_box(&command));
        })
    });
}

fn bench_password_hashing(c: &mut Criterion) {
    let input = "correct-horse-battery-staple:3q2+7wA9ZlJ0c2FsdHNhbHRzYWx0c2FsdA==";

    c.bench_function("sha256_password_hashing", |b| {
        b.iter(|| {
            let mut hasher = Sha256::new();
            hasher.update(black_box(input).as_bytes());
            let _ = hasher.finalize();
        })
    });
}

criterion_group!(benches, bench_validation, bench_password_hashing);
criterion_main!(benches);
