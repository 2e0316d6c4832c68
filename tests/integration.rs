use std::{cell::RefCell, rc::Rc, str::from_utf8};

use bankz::teller::Teller;

const TEST_FILE: &str = include_str!("teller_ops.csv");

#[test]
fn run_teller_script() {
    let mut output = Vec::new();
    let errors = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&errors);
    let teller = Teller {
        input: TEST_FILE.as_bytes(),
        output: &mut output,
        error_printer: Box::new(move |line, err| {
            sink.borrow_mut().push((line, err.to_string()));
        }),
    };
    teller.run().unwrap();

    // aliases print in alphabetical order, so the output is deterministic
    let lines: Vec<String> = from_utf8(&output)
        .unwrap()
        .lines()
        .map(ToOwned::to_owned)
        .collect();
    assert_eq!(
        lines,
        vec![
            "alias,owner,type,balance,status",
            "ada-main,ada,Checking,35,ACTIVE",
            "ada-save,ada,Savings,25,FROZEN",
            "grace-main,grace,Checking,61.00,CLOSED",
        ]
    );

    let errors = errors.borrow();
    assert_eq!(
        *errors,
        vec![
            (13, "insufficient funds: available balance is 35".to_string()),
            (
                14,
                "transfer source and destination are the same account".to_string()
            ),
            (15, "no account bound to alias `nobody`".to_string()),
        ]
    );
}
