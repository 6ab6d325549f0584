//! End-to-end coverage of the descriptor scanner against a
//! `FileDescriptorProto` shaped like the classic `addressbook.proto`
//! tutorial schema: a `Person` message with a nested `PhoneType` enum and a
//! nested `PhoneNumber` message, plus a top-level `AddressBook` message
//! that references `Person` by name. The scanner has to find it wrapped in
//! unrelated bytes on both sides, exactly as it would inside a binary that
//! links the generated descriptor in.
//!
//! The fixture bytes are built field-by-field with the same tag/varint
//! helpers the unit tests in `src/scan.rs` and `src/descriptor.rs` use,
//! rather than transcribed as a byte literal, so the expected `.proto`
//! output below can be checked by construction against the field numbers
//! actually written.

use protodec::varint::write_varint;

fn bytes_tag(field: u32, payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    out.push(((field << 3) | 2) as u8);
    let mut len_buf = [0u8; 10];
    let end = write_varint(payload.len() as i64, &mut len_buf, 0, len_buf.len());
    out.extend_from_slice(&len_buf[..end]);
    out.extend_from_slice(payload);
    out
}

fn varint_tag(field: u32, value: i64) -> Vec<u8> {
    let mut out = Vec::new();
    out.push((field << 3) as u8);
    let mut val_buf = [0u8; 10];
    let end = write_varint(value, &mut val_buf, 0, val_buf.len());
    out.extend_from_slice(&val_buf[..end]);
    out
}

fn phone_type_enum() -> Vec<u8> {
    let mobile = [bytes_tag(1, b"MOBILE"), varint_tag(2, 0)].concat();
    let home = [bytes_tag(1, b"HOME"), varint_tag(2, 1)].concat();
    let work = [bytes_tag(1, b"WORK"), varint_tag(2, 2)].concat();
    [
        bytes_tag(1, b"PhoneType"),
        bytes_tag(2, &mobile),
        bytes_tag(2, &home),
        bytes_tag(2, &work),
    ]
    .concat()
}

fn phone_number_message() -> Vec<u8> {
    let number_field = [
        bytes_tag(1, b"number"),
        varint_tag(3, 1),
        varint_tag(4, 2), // required
        varint_tag(5, 9), // string
    ]
    .concat();
    let type_field = [
        bytes_tag(1, b"type"),
        varint_tag(3, 2),
        varint_tag(4, 1),  // optional
        varint_tag(5, 14), // enum
        bytes_tag(6, b".tutorial.Person.PhoneType"),
        bytes_tag(7, b"HOME"),
    ]
    .concat();
    [
        bytes_tag(1, b"PhoneNumber"),
        bytes_tag(2, &number_field),
        bytes_tag(2, &type_field),
    ]
    .concat()
}

fn person_message() -> Vec<u8> {
    let name_field = [
        bytes_tag(1, b"name"),
        varint_tag(3, 1),
        varint_tag(4, 2), // required
        varint_tag(5, 9), // string
    ]
    .concat();
    let id_field = [
        bytes_tag(1, b"id"),
        varint_tag(3, 2),
        varint_tag(4, 2), // required
        varint_tag(5, 5), // int32
    ]
    .concat();
    let email_field = [
        bytes_tag(1, b"email"),
        varint_tag(3, 3),
        varint_tag(4, 1), // optional
        varint_tag(5, 9), // string
    ]
    .concat();
    let phone_field = [
        bytes_tag(1, b"phone"),
        varint_tag(3, 4),
        varint_tag(4, 3),  // repeated
        varint_tag(5, 11), // message
        bytes_tag(6, b".tutorial.Person.PhoneNumber"),
    ]
    .concat();

    [
        bytes_tag(1, b"Person"),
        bytes_tag(4, &phone_type_enum()),
        bytes_tag(3, &phone_number_message()),
        bytes_tag(2, &name_field),
        bytes_tag(2, &id_field),
        bytes_tag(2, &email_field),
        bytes_tag(2, &phone_field),
    ]
    .concat()
}

fn address_book_message() -> Vec<u8> {
    let person_field = [
        bytes_tag(1, b"person"),
        varint_tag(3, 1),
        varint_tag(4, 3),  // repeated
        varint_tag(5, 11), // message
        bytes_tag(6, b".tutorial.Person"),
    ]
    .concat();
    [bytes_tag(1, b"AddressBook"), bytes_tag(2, &person_field)].concat()
}

fn addressbook_descriptor_bytes() -> Vec<u8> {
    [
        bytes_tag(1, b"addressbook.proto"),
        bytes_tag(2, b"tutorial"),
        bytes_tag(4, &person_message()),
        bytes_tag(4, &address_book_message()),
    ]
    .concat()
}

#[test]
fn grab_reconstructs_addressbook_proto_from_garbage() {
    let mut buf = b"BEGINOFGARBAGEGARBAGEGARBAGEGARBAGEGARBAGEGARBAGE".to_vec();
    buf.extend_from_slice(&addressbook_descriptor_bytes());
    buf.push(0);
    buf.extend_from_slice(b"ENDOFGARBAGEGARBAGEGARBAGEGARBAGEGARBAGEGARBAGE");

    let dir = tempfile::tempdir().unwrap();
    let mut rejected = Vec::new();
    let written = protodec::scan::grab(&buf, dir.path(), |outcome| {
        if let protodec::scan::GrabOutcome::Rejected { filename, error } = outcome {
            rejected.push((filename.clone(), error.clone()));
        }
    });

    assert_eq!(written, 1, "expected exactly one descriptor written, rejected: {rejected:?}");

    let contents = std::fs::read_to_string(dir.path().join("addressbook.proto")).unwrap();
    insta::assert_snapshot!(contents, @r###"
    package tutorial;
    message Person {
    	enum PhoneType {
    		MOBILE = 0;
    		HOME = 1;
    		WORK = 2;
    	}
    	message PhoneNumber {
    		required string number = 1;
    		optional .tutorial.Person.PhoneType type = 2 [default = HOME];
    	}
    	required string name = 1;
    	required int32 id = 2;
    	optional string email = 3;
    	repeated .tutorial.Person.PhoneNumber phone = 4;
    }
    message AddressBook {
    	repeated .tutorial.Person person = 1;
    }
    "###);
}
