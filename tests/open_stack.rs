//! Open a small version 2 stack built in memory, from the header down to the
//! scripts of its cards.

use hyperstack::common::Error;
use hyperstack::script::{Command, GoDestination, HandlerKind, Statement};
use hyperstack::stack::OpenOptions;
use hyperstack::stack::blocks::UserLevel;
use hyperstack::stack::checksum::{list_checksum, page_checksum};
use hyperstack::stack::version::FileVersion;

const LIST_ID: i32 = 2;
const PAGE_ID: i32 = 3;
const BACKGROUND_ID: i32 = 2600;
const FIRST_CARD_ID: i32 = 3000;
const SECOND_CARD_ID: i32 = 3100;

const STACK_SCRIPT: &str = "on openStack\r  go to card 2\rend openStack\r";
const CARD_SCRIPT: &str = "on mouseUp\r  go to next card\rend mouseUp\r";

fn put_u16(data: &mut [u8], offset: usize, value: u16) {
    data[offset..offset + 2].copy_from_slice(&value.to_be_bytes());
}

fn put_u32(data: &mut [u8], offset: usize, value: u32) {
    data[offset..offset + 4].copy_from_slice(&value.to_be_bytes());
}

fn put_i32(data: &mut [u8], offset: usize, value: i32) {
    data[offset..offset + 4].copy_from_slice(&value.to_be_bytes());
}

/// A block of `size` zero bytes with its length, tag and identifier set.
fn block(tag: &[u8; 4], identifier: i32, size: usize) -> Vec<u8> {
    let mut data = vec![0u8; size];
    put_u32(&mut data, 0, size as u32);
    data[4..8].copy_from_slice(tag);
    put_i32(&mut data, 8, identifier);
    data
}

/// A card or background without parts nor contents, the counters ending at
/// the end of `header`.
fn layer(mut data: Vec<u8>, name: &str, script: &str) -> Vec<u8> {
    let counters = data.len() - 0xE;
    put_u16(&mut data, counters + 2, 1);
    data.extend_from_slice(name.as_bytes());
    data.push(0);
    data.extend_from_slice(script.as_bytes());
    data.push(0);
    let length = data.len() as u32;
    put_u32(&mut data, 0, length);
    data
}

fn stack_header() -> Vec<u8> {
    let mut data = block(b"STAK", -1, 0x800);
    put_u32(&mut data, 0x10, 10);
    put_u32(&mut data, 0x24, 1);
    put_i32(&mut data, 0x28, BACKGROUND_ID);
    put_u32(&mut data, 0x2C, 2);
    put_i32(&mut data, 0x30, FIRST_CARD_ID);
    put_i32(&mut data, 0x34, LIST_ID);
    put_u16(&mut data, 0x48, 4);
    data[0x600..0x600 + STACK_SCRIPT.len()].copy_from_slice(STACK_SCRIPT.as_bytes());

    let sum = (0..0x180)
        .map(|i| u32::from_be_bytes(data[i * 4..i * 4 + 4].try_into().unwrap()))
        .fold(0u32, u32::wrapping_add);
    put_u32(&mut data, 0x70, 0u32.wrapping_sub(sum));
    data
}

fn list() -> Vec<u8> {
    let mut data = block(b"LIST", LIST_ID, 0x36);
    put_u32(&mut data, 0x10, 1);
    put_u32(&mut data, 0x14, 0x800);
    put_u32(&mut data, 0x18, 2);
    put_u16(&mut data, 0x1C, 8);
    put_u16(&mut data, 0x20, 1);
    put_u32(&mut data, 0x24, list_checksum([(PAGE_ID, 2)]));
    put_u32(&mut data, 0x28, 2);
    put_i32(&mut data, 0x30, PAGE_ID);
    put_u16(&mut data, 0x34, 2);
    data
}

fn page() -> Vec<u8> {
    let mut data = block(b"PAGE", PAGE_ID, 0x28);
    put_i32(&mut data, 0x10, LIST_ID);
    put_u32(&mut data, 0x14, page_checksum([FIRST_CARD_ID, SECOND_CARD_ID]));
    // First card of the background, then a marked card
    put_i32(&mut data, 0x18, FIRST_CARD_ID);
    put_u16(&mut data, 0x1C, 0x4000);
    put_i32(&mut data, 0x20, SECOND_CARD_ID);
    put_u16(&mut data, 0x24, 0x1000);
    data
}

fn background() -> Vec<u8> {
    let mut data = block(b"BKGD", BACKGROUND_ID, 0x32);
    put_u32(&mut data, 0x18, 2);
    put_i32(&mut data, 0x1C, BACKGROUND_ID);
    put_i32(&mut data, 0x20, BACKGROUND_ID);
    layer(data, "Main", "")
}

fn card(identifier: i32, name: &str, script: &str) -> Vec<u8> {
    let mut data = block(b"CARD", identifier, 0x36);
    put_i32(&mut data, 0x20, PAGE_ID);
    put_i32(&mut data, 0x24, BACKGROUND_ID);
    layer(data, name, script)
}

/// The stack header, the master block, then every other block on a 32-byte
/// boundary.
fn stack_file() -> Vec<u8> {
    let blocks = [
        (LIST_ID, list()),
        (PAGE_ID, page()),
        (BACKGROUND_ID, background()),
        (FIRST_CARD_ID, card(FIRST_CARD_ID, "First", "")),
        (SECOND_CARD_ID, card(SECOND_CARD_ID, "Second", CARD_SCRIPT)),
    ];

    let mut data = stack_header();
    let master_offset = data.len();
    data.extend_from_slice(&block(b"MAST", -1, 0x40));

    for (index, (identifier, bytes)) in blocks.into_iter().enumerate() {
        let offset = data.len();
        let entry = ((offset / 32) as u32) << 8 | (identifier as u32 & 0xFF);
        put_u32(&mut data, master_offset + 0x20 + index * 4, entry);
        data.extend_from_slice(&bytes);
        data.resize(data.len().next_multiple_of(32), 0);
    }
    data
}

#[test]
fn test_open_stack() {
    let _ = env_logger::builder().is_test(true).try_init();
    let stack = hyperstack::open_stack(stack_file(), &OpenOptions::default()).unwrap();

    assert_eq!(stack.version, FileVersion::V2);
    assert_eq!(stack.user_level.get().unwrap(), UserLevel::Authoring);
    let size = stack.size.get().unwrap();
    assert_eq!((size.width, size.height), (512, 342));
    assert_eq!(stack.declared_card_count.get().unwrap(), 2);
    assert_eq!(stack.card_count.get().unwrap(), 2);
    assert!(stack.fonts.get().unwrap().is_empty());
}

#[test]
fn test_cards_and_backgrounds() {
    let stack = hyperstack::open_stack(stack_file(), &OpenOptions::default()).unwrap();

    let cards = stack.cards.get().unwrap();
    let identifiers: Vec<i32> = cards.iter().map(|c| c.layer.identifier).collect();
    assert_eq!(identifiers, vec![FIRST_CARD_ID, SECOND_CARD_ID]);
    assert_eq!(cards[0].layer.name.get().unwrap(), "First");
    assert_eq!(cards[1].layer.name.get().unwrap(), "Second");
    assert!(cards[0].reference.is_start_of_background);
    assert!(cards[1].layer.parts.get().unwrap().is_empty());

    let background = cards[1].background.get().unwrap();
    assert_eq!(background.layer.identifier, BACKGROUND_ID);
    assert_eq!(background.layer.name.get().unwrap(), "Main");
    assert_eq!(background.card_count.get().unwrap(), 2);
    assert_eq!(stack.backgrounds.get().unwrap().len(), 1);
    assert_eq!(stack.cards_of_background(BACKGROUND_ID).unwrap().len(), 2);

    let marked = stack.marked_cards().unwrap();
    assert_eq!(marked.len(), 1);
    assert_eq!(marked[0].layer.identifier, SECOND_CARD_ID);
    assert!(stack.card(42).unwrap().is_none());
}

#[test]
fn test_scripts() {
    let stack = hyperstack::open_stack(stack_file(), &OpenOptions::default()).unwrap();

    let script = hyperstack::parse_script(&stack.script.get().unwrap()).unwrap();
    let open_stack = script.handler("openstack").unwrap();
    assert_eq!(open_stack.kind, HandlerKind::Message);
    assert_eq!(open_stack.statements.len(), 1);

    let card = stack.card(SECOND_CARD_ID).unwrap().unwrap();
    let script = hyperstack::parse_script(&card.layer.script.get().unwrap()).unwrap();
    let mouse_up = script.handler("mouseUp").unwrap();
    assert!(matches!(
        mouse_up.statements[0],
        Statement::Command(Command::Go(GoDestination::Card(_)))
    ));
}

#[test]
fn test_not_a_stack() {
    let mut data = stack_file();
    data[4..8].copy_from_slice(b"JUNK");
    assert!(matches!(
        hyperstack::open_stack(data, &OpenOptions::default()),
        Err(Error::NotAStack)
    ));
}

#[test]
fn test_header_checksum() {
    let mut data = stack_file();
    put_u32(&mut data, 0x2C, 3);
    assert!(matches!(
        hyperstack::open_stack(data.clone(), &OpenOptions::default()),
        Err(Error::CorruptedFile(_))
    ));

    let options = OpenOptions::new().with_checksum_verification(false);
    let stack = hyperstack::open_stack(data, &options).unwrap();
    assert_eq!(stack.card_count.get().unwrap(), 2);
}

#[test]
fn test_page_checksum_is_only_a_warning() {
    let mut data = stack_file();
    let page = data
        .windows(4)
        .position(|window| window == b"PAGE")
        .unwrap()
        - 4;
    put_u32(&mut data, page + 0x14, 0xDEAD_BEEF);

    let stack = hyperstack::open_stack(data, &OpenOptions::default()).unwrap();
    assert_eq!(stack.card_count.get().unwrap(), 2);
}

#[test]
fn test_missing_card_block() {
    let mut data = stack_file();
    let card = data
        .windows(4)
        .rposition(|window| window == b"CARD")
        .unwrap()
        - 4;
    put_i32(&mut data, card + 8, 9999);

    let stack = hyperstack::open_stack(data, &OpenOptions::default()).unwrap();
    let card = stack.card(SECOND_CARD_ID).unwrap().unwrap();
    assert!(matches!(
        card.layer.name.get(),
        Err(Error::MissingBlock { identifier: SECOND_CARD_ID, .. })
    ));
}

#[test]
fn test_truncated_directory_record_is_skipped() {
    let mut data = stack_file();
    let master_entries = 0x800 + 0x20;

    // A card header cut short at the end of the file, listed first
    let truncated = data.len();
    data.extend_from_slice(&0x40u32.to_be_bytes());
    data.extend_from_slice(b"CARD");
    let entries: Vec<u8> = data[master_entries..master_entries + 5 * 4].to_vec();
    data[master_entries + 4..master_entries + 6 * 4].copy_from_slice(&entries);
    let entry = ((truncated / 32) as u32) << 8 | (SECOND_CARD_ID as u32 & 0xFF);
    put_u32(&mut data, master_entries, entry);

    let stack = hyperstack::open_stack(data, &OpenOptions::default()).unwrap();
    let card = stack.card(SECOND_CARD_ID).unwrap().unwrap();
    assert_eq!(card.layer.name.get().unwrap(), "Second");
    assert_eq!(stack.card_count.get().unwrap(), 2);
}
