/// sample run - quarterly loan before and after an additional payment
use chrono::NaiveDate;
use loan_amortization::{Loan, Money, PaymentFrequency, Rate};
use rust_decimal_macros::dec;
use simple_logger::SimpleLogger;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    SimpleLogger::new()
        .with_level(log::LevelFilter::Info)
        .init()?;

    let start = NaiveDate::from_ymd_opt(2023, 9, 1).ok_or("invalid start date")?;
    let extra_date = NaiveDate::from_ymd_opt(2023, 12, 2).ok_or("invalid payment date")?;

    let mut loan = Loan::builder()
        .start_date(start)
        .initial_value(Money::from_major(179_596))
        .payment_frequency(PaymentFrequency::Quarterly)
        .payment(Money::from_decimal(dec!(5012.57)))
        .interest_rate(Rate::from_decimal(dec!(0.07)))
        .build()?;

    let table = loan.create_amortization()?;
    println!("Interests paid {:.2}", table.total_interest());

    loan.add_payment(extra_date, Money::from_major(30_000));
    let table = loan.create_amortization()?;
    println!("Interests paid {:.2}", table.total_interest());
    println!("{}", table);

    Ok(())
}
